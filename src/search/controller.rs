use super::matcher::{LineMatcher, MatchError};
use crate::app::DiffCache;

/// Outcome of the cross-file search.
///
/// "Searched and found nothing" is kept apart from "not filtering": the
/// first hides nothing but reports `no matches`, the second is silent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileFilter {
    #[default]
    Unfiltered,
    NoMatches,
    /// Ascending, non-empty list of file indices
    Matches(Vec<usize>),
}

/// Owns the search query and the cross-file result set
#[derive(Debug, Default)]
pub struct SearchController {
    active: bool,
    query: String,
    filter: FileFilter,
    matcher_error: Option<String>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.query.clear();
        self.filter = FileFilter::Unfiltered;
        self.matcher_error = None;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.query.clear();
        self.filter = FileFilter::Unfiltered;
        self.matcher_error = None;
    }

    // ── Query editing ──

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    /// Returns false when the query was already empty
    pub fn pop_char(&mut self) -> bool {
        self.query.pop().is_some()
    }

    // ── Searching ──

    /// Match `query` against every cached diff, in `paths` order.
    ///
    /// Paths without a cached (or with an empty) diff are skipped, so the
    /// resulting indices are positions in `paths` whose diff has at least one
    /// matching line.
    pub fn search_all_files<'a>(
        &mut self,
        query: &str,
        paths: impl IntoIterator<Item = &'a str>,
        cache: &DiffCache,
        matcher: &dyn LineMatcher,
    ) {
        self.query = query.to_string();
        self.matcher_error = None;

        if query.is_empty() {
            self.filter = FileFilter::Unfiltered;
            return;
        }

        let mut matching = Vec::new();
        for (idx, path) in paths.into_iter().enumerate() {
            let diff = match cache.get(path) {
                Some(d) if !d.is_empty() => d,
                _ => continue,
            };
            let lines: Vec<&str> = diff.lines().collect();
            match matcher.contains_match(query, &lines) {
                Ok(true) => matching.push(idx),
                Ok(false) => {}
                Err(MatchError::Unavailable(msg)) => {
                    self.matcher_error = Some(msg);
                    self.filter = FileFilter::NoMatches;
                    return;
                }
                Err(err) => {
                    log::warn!("search in {} failed: {}", path, err);
                }
            }
        }

        self.filter = if matching.is_empty() {
            FileFilter::NoMatches
        } else {
            FileFilter::Matches(matching)
        };
    }

    /// Matching line indices in one diff. Matcher failures come back as an
    /// empty result; unavailability is also recorded for `status()`.
    pub fn search_in_diff(
        &mut self,
        query: &str,
        lines: &[&str],
        matcher: &dyn LineMatcher,
    ) -> Vec<usize> {
        if query.is_empty() || lines.is_empty() {
            return Vec::new();
        }
        match matcher.match_lines(query, lines) {
            Ok(matches) => matches,
            Err(MatchError::Unavailable(msg)) => {
                self.matcher_error = Some(msg);
                Vec::new()
            }
            Err(err) => {
                log::warn!("in-diff search failed: {}", err);
                Vec::new()
            }
        }
    }

    // ── Results ──

    /// Matching file indices, or None when nothing should be filtered
    pub fn filtered_indices(&self) -> Option<&[usize]> {
        match &self.filter {
            FileFilter::Matches(indices) => Some(indices),
            _ => None,
        }
    }

    pub fn has_no_matches(&self) -> bool {
        self.filter == FileFilter::NoMatches
    }

    pub fn matcher_error(&self) -> Option<&str> {
        self.matcher_error.as_deref()
    }

    pub fn status(&self) -> String {
        if let Some(err) = &self.matcher_error {
            return err.clone();
        }
        match &self.filter {
            FileFilter::NoMatches => "no matches".to_string(),
            FileFilter::Matches(indices) if indices.len() == 1 => "1 file".to_string(),
            FileFilter::Matches(indices) => format!("{} files", indices.len()),
            FileFilter::Unfiltered => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::matcher::SubstringMatcher;

    struct Unavailable;

    impl LineMatcher for Unavailable {
        fn name(&self) -> &'static str {
            "missing"
        }
        fn match_lines(&self, query: &str, lines: &[&str]) -> Result<Vec<usize>, MatchError> {
            if query.is_empty() || lines.is_empty() {
                return Ok(Vec::new());
            }
            Err(MatchError::Unavailable("fzf not found".into()))
        }
    }

    struct Broken;

    impl LineMatcher for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn match_lines(&self, _query: &str, _lines: &[&str]) -> Result<Vec<usize>, MatchError> {
            Err(MatchError::Failed("pipe closed".into()))
        }
    }

    const FILES: [&str; 3] = ["a.go", "b.go", "c.go"];

    fn cache() -> DiffCache {
        let mut cache = DiffCache::new();
        cache.put("a.go", "+func foo() {}\n context".to_string());
        cache.put("b.go", "+func bar() {}".to_string());
        cache.put("c.go", "-// foo was here".to_string());
        cache
    }

    fn searched(query: &str) -> SearchController {
        let mut c = SearchController::new();
        c.activate();
        c.search_all_files(query, FILES, &cache(), &SubstringMatcher::default());
        c
    }

    // ── search_all_files ──

    #[test]
    fn matching_files_in_list_order() {
        let c = searched("foo");
        assert_eq!(c.filtered_indices(), Some(&[0, 2][..]));
        assert!(!c.has_no_matches());
        assert_eq!(c.status(), "2 files");
    }

    #[test]
    fn zero_matching_files_sets_no_matches() {
        let c = searched("zzz");
        assert_eq!(c.filtered_indices(), None);
        assert!(c.has_no_matches());
        assert_eq!(c.status(), "no matches");
    }

    #[test]
    fn single_match_status_is_singular() {
        let c = searched("bar");
        assert_eq!(c.filtered_indices(), Some(&[1][..]));
        assert_eq!(c.status(), "1 file");
    }

    #[test]
    fn empty_query_clears_without_no_matches() {
        let mut c = searched("foo");
        c.search_all_files("", FILES, &cache(), &SubstringMatcher::default());
        assert_eq!(c.filter, FileFilter::Unfiltered);
        assert!(!c.has_no_matches());
        assert_eq!(c.status(), "");
    }

    #[test]
    fn uncached_and_empty_diffs_are_skipped() {
        let mut cache = DiffCache::new();
        cache.put("a.go", String::new());
        cache.put("c.go", "foo".to_string());
        let mut c = SearchController::new();
        c.search_all_files("foo", FILES, &cache, &SubstringMatcher::default());
        assert_eq!(c.filtered_indices(), Some(&[2][..]));
    }

    #[test]
    fn search_records_query() {
        let c = searched("foo");
        assert_eq!(c.query(), "foo");
    }

    #[test]
    fn unavailable_matcher_reports_status_and_no_matches() {
        let mut c = SearchController::new();
        c.search_all_files("foo", FILES, &cache(), &Unavailable);
        assert!(c.has_no_matches());
        assert_eq!(c.filtered_indices(), None);
        assert_eq!(c.status(), "fzf not found");
    }

    #[test]
    fn failing_matcher_treats_files_as_non_matching() {
        let mut c = SearchController::new();
        c.search_all_files("foo", FILES, &cache(), &Broken);
        assert!(c.has_no_matches());
        assert_eq!(c.matcher_error(), None);
    }

    #[test]
    fn matcher_error_cleared_by_next_search() {
        let mut c = SearchController::new();
        c.search_all_files("foo", FILES, &cache(), &Unavailable);
        c.search_all_files("foo", FILES, &cache(), &SubstringMatcher::default());
        assert_eq!(c.status(), "2 files");
    }

    // ── search_in_diff ──

    #[test]
    fn search_in_diff_returns_lines() {
        let mut c = SearchController::new();
        let lines = ["a", "foo", "b", "foo foo"];
        assert_eq!(
            c.search_in_diff("foo", &lines, &SubstringMatcher::default()),
            vec![1, 3]
        );
    }

    #[test]
    fn search_in_diff_empty_inputs() {
        let mut c = SearchController::new();
        let m = SubstringMatcher::default();
        assert!(c.search_in_diff("", &["foo"], &m).is_empty());
        assert!(c.search_in_diff("foo", &[], &m).is_empty());
    }

    #[test]
    fn search_in_diff_unavailable_sets_status() {
        let mut c = SearchController::new();
        assert!(c.search_in_diff("foo", &["foo"], &Unavailable).is_empty());
        assert_eq!(c.status(), "fzf not found");
    }

    // ── activation ──

    #[test]
    fn activate_resets_query_and_results() {
        let mut c = searched("foo");
        c.activate();
        assert!(c.is_active());
        assert_eq!(c.query(), "");
        assert_eq!(c.filter, FileFilter::Unfiltered);
    }

    #[test]
    fn deactivate_is_idempotent() {
        let mut c = searched("foo");
        c.deactivate();
        assert!(!c.is_active());
        assert_eq!(c.query(), "");
        assert_eq!(c.filter, FileFilter::Unfiltered);
        c.deactivate();
        assert!(!c.is_active());
        assert_eq!(c.query(), "");
        assert_eq!(c.filter, FileFilter::Unfiltered);
        assert_eq!(c.status(), "");
    }

    #[test]
    fn query_editing() {
        let mut c = SearchController::new();
        c.activate();
        c.push_char('f');
        c.push_char('o');
        assert_eq!(c.query(), "fo");
        assert!(c.pop_char());
        assert!(c.pop_char());
        assert!(!c.pop_char());
    }
}
