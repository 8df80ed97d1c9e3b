use crate::search::MatcherKind;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TcrConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// [search] section
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub matcher: MatcherKind,
    /// Only consulted by the builtin matcher
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

/// [display] section
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// File list width; capped at a third of the terminal
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u16,
}

/// [watch] section
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_sidebar_width() -> u16 {
    30
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherKind::default(),
            case_sensitive: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sidebar_width: default_sidebar_width(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Load config: defaults < `<config dir>/tcr/config.toml` < `<repo>/.tcr.toml`.
/// Tables are merged key by key; unreadable or invalid files are ignored.
pub fn load_config(repo_root: &Path) -> TcrConfig {
    let global = dirs::config_dir().and_then(|d| read_table(&d.join("tcr/config.toml")));
    let local = read_table(&repo_root.join(".tcr.toml"));
    merge_config(global, local)
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match content.parse::<toml::Table>() {
        Ok(t) => Some(t),
        Err(e) => {
            log::warn!("ignoring invalid config {}: {}", path.display(), e);
            None
        }
    }
}

fn merge_config(global: Option<toml::Table>, local: Option<toml::Table>) -> TcrConfig {
    let merged = match (global, local) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return TcrConfig::default(),
    };

    toml::Value::Table(merged).try_into().unwrap_or_else(|e| {
        log::warn!("config has unexpected shape, using defaults: {}", e);
        TcrConfig::default()
    })
}

/// Recursively merge `overlay` into `base`; overlay values win, nested
/// tables merge instead of replacing each other.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> Option<toml::Table> {
        Some(src.parse::<toml::Table>().unwrap())
    }

    #[test]
    fn defaults_without_files() {
        let cfg = merge_config(None, None);
        assert_eq!(cfg.search.matcher, MatcherKind::Builtin);
        assert!(cfg.search.case_sensitive);
        assert_eq!(cfg.display.sidebar_width, 30);
        assert!(!cfg.watch.enabled);
        assert_eq!(cfg.watch.debounce_ms, 500);
    }

    #[test]
    fn local_overrides_single_key_and_keeps_siblings() {
        let global = table("[search]\nmatcher = \"fzf\"\ncase_sensitive = false\n");
        let local = table("[search]\ncase_sensitive = true\n");
        let cfg = merge_config(global, local);
        assert_eq!(cfg.search.matcher, MatcherKind::Fzf);
        assert!(cfg.search.case_sensitive);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let cfg = merge_config(None, table("[watch]\nenabled = true\n"));
        assert!(cfg.watch.enabled);
        assert_eq!(cfg.watch.debounce_ms, 500);
        assert_eq!(cfg.display.sidebar_width, 30);
    }

    #[test]
    fn bad_value_falls_back_to_defaults() {
        let cfg = merge_config(table("[display]\nsidebar_width = \"wide\"\n"), None);
        assert_eq!(cfg.display.sidebar_width, 30);
    }

    #[test]
    fn load_reads_repo_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".tcr.toml"), "[display]\nsidebar_width = 40\n").unwrap();
        let cfg = load_config(dir.path());
        assert_eq!(cfg.display.sidebar_width, 40);
    }

    #[test]
    fn load_ignores_unparseable_repo_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".tcr.toml"), "not = [valid").unwrap();
        let cfg = load_config(dir.path());
        assert_eq!(cfg.search.matcher, MatcherKind::Builtin);
    }
}
