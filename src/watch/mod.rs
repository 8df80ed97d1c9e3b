use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// Events emitted by the file watcher
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// One or more working-copy files changed
    FilesChanged(Vec<PathBuf>),
}

/// A debounced watcher over the working copy
pub struct FileWatcher {
    _watcher: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

impl FileWatcher {
    /// Watch `root` recursively. `ignored` paths (e.g. the feedback file,
    /// which may live inside the repo) never trigger an event.
    pub fn new(
        root: &Path,
        debounce_ms: u64,
        ignored: Vec<PathBuf>,
        tx: mpsc::Sender<WatchEvent>,
    ) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let ignored: Vec<PathBuf> = ignored.iter().map(|p| resolve_path(p, &cwd)).collect();
        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: std::result::Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    let paths: Vec<PathBuf> = events
                        .into_iter()
                        .filter(|e| e.kind == DebouncedEventKind::Any)
                        .map(|e| e.path)
                        .filter(|p| is_relevant(p, &ignored))
                        .collect();
                    if !paths.is_empty() {
                        log::debug!("watch: {} path(s) changed", paths.len());
                        let _ = tx.send(WatchEvent::FilesChanged(paths));
                    }
                }
                Err(e) => log::warn!("watch error: {}", e),
            },
        )?;

        debouncer.watcher().watch(root, RecursiveMode::Recursive)?;

        Ok(FileWatcher {
            _watcher: debouncer,
        })
    }
}

/// Absolute form of `path` as notify reports it: relative paths are taken
/// from `base`, and the parent directory is canonicalized when it exists
/// (the file itself may not have been written yet).
fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let abs = if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    };
    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) => match parent.canonicalize() {
            Ok(dir) => dir.join(name),
            Err(_) => abs,
        },
        _ => abs,
    }
}

/// Skip VCS bookkeeping, except the git index and refs (staging and
/// commits change what the review shows). jj state is always skipped:
/// its working-copy snapshot is taken from the files themselves.
fn is_relevant(path: &Path, ignored: &[PathBuf]) -> bool {
    if ignored.iter().any(|i| i == path) {
        return false;
    }

    let parts: Vec<&std::ffi::OsStr> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s),
            _ => None,
        })
        .collect();

    if parts.iter().any(|p| *p == ".jj") {
        return false;
    }
    match parts.iter().position(|p| *p == ".git") {
        Some(i) => match parts.get(i + 1) {
            Some(next) => (*next == "index" && parts.len() == i + 2) || *next == "refs",
            None => false,
        },
        None => true,
    }
}
