use crate::vcs::{FileChange, Vcs};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Results of background VCS work, delivered to the event loop.
///
/// Every job sends exactly one event. `generation` is the file-list load
/// the job was started under; the coordinator drops events from older
/// generations.
#[derive(Debug)]
pub enum AppEvent {
    FilesLoaded {
        generation: u64,
        result: anyhow::Result<Vec<FileChange>>,
    },
    DiffLoaded {
        generation: u64,
        path: String,
        result: anyhow::Result<String>,
    },
    PreloadComplete {
        generation: u64,
        diffs: Vec<(String, String)>,
        failed: usize,
    },
}

pub fn spawn_file_load(vcs: Arc<dyn Vcs>, generation: u64, tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        let result = vcs.changed_files();
        let _ = tx.send(AppEvent::FilesLoaded { generation, result });
    });
}

pub fn spawn_diff_load(vcs: Arc<dyn Vcs>, generation: u64, path: String, tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        let result = vcs.diff(&path);
        let _ = tx.send(AppEvent::DiffLoaded {
            generation,
            path,
            result,
        });
    });
}

/// Load every path in order on one thread and report them as a single batch
pub fn spawn_preload(vcs: Arc<dyn Vcs>, generation: u64, paths: Vec<String>, tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        let (diffs, failed) = load_batch(vcs.as_ref(), paths);
        let _ = tx.send(AppEvent::PreloadComplete {
            generation,
            diffs,
            failed,
        });
    });
}

/// Per-file failures are logged and left out of the batch
pub(crate) fn load_batch(vcs: &dyn Vcs, paths: Vec<String>) -> (Vec<(String, String)>, usize) {
    let requested = paths.len();
    let mut diffs = Vec::with_capacity(requested);
    let mut failed = 0;

    for path in paths {
        match vcs.diff(&path) {
            Ok(diff) => diffs.push((path, diff)),
            Err(e) => {
                log::warn!("preload: failed to load diff for {}: {:#}", path, e);
                failed += 1;
            }
        }
    }

    log::info!(
        "preload: {} requested, {} loaded, {} failed",
        requested,
        diffs.len(),
        failed
    );
    (diffs, failed)
}
