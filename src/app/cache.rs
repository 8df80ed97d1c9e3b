use std::collections::HashMap;

/// Diff text by path, filled lazily on selection and in bulk by the search
/// preload. Entries are only dropped by `clear` on a full reload.
#[derive(Debug, Default)]
pub struct DiffCache {
    diffs: HashMap<String, String>,
}

impl DiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.diffs.get(path).map(String::as_str)
    }

    pub fn has(&self, path: &str) -> bool {
        self.diffs.contains_key(path)
    }

    pub fn put(&mut self, path: impl Into<String>, diff: String) {
        self.diffs.insert(path.into(), diff);
    }

    /// Merge a preload batch. Entries already present win: a single-file
    /// load that landed while the batch was running is never overwritten.
    pub fn merge_batch(&mut self, batch: Vec<(String, String)>) -> usize {
        let mut added = 0;
        for (path, diff) in batch {
            if !self.diffs.contains_key(&path) {
                self.diffs.insert(path, diff);
                added += 1;
            }
        }
        added
    }

    /// Paths from `paths` that still need loading, in the given order
    pub fn missing<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        paths
            .into_iter()
            .filter(|p| !self.has(p))
            .map(str::to_string)
            .collect()
    }

    pub fn clear(&mut self) {
        self.diffs.clear();
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let mut cache = DiffCache::new();
        cache.put("a.rs", "+foo".to_string());
        assert_eq!(cache.get("a.rs"), Some("+foo"));
        assert!(cache.has("a.rs"));
        assert!(!cache.has("b.rs"));
        assert_eq!(cache.get("b.rs"), None);
    }

    #[test]
    fn merge_batch_keeps_existing_entries() {
        let mut cache = DiffCache::new();
        cache.put("a.rs", "fresh".to_string());
        let added = cache.merge_batch(vec![
            ("a.rs".to_string(), "stale".to_string()),
            ("b.rs".to_string(), "new".to_string()),
        ]);
        assert_eq!(added, 1);
        assert_eq!(cache.get("a.rs"), Some("fresh"));
        assert_eq!(cache.get("b.rs"), Some("new"));
    }

    #[test]
    fn missing_preserves_file_order() {
        let mut cache = DiffCache::new();
        cache.put("b.rs", String::new());
        let missing = cache.missing(["c.rs", "b.rs", "a.rs"]);
        assert_eq!(missing, vec!["c.rs".to_string(), "a.rs".to_string()]);
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = DiffCache::new();
        cache.put("a.rs", "x".to_string());
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(!cache.has("a.rs"));
    }
}
