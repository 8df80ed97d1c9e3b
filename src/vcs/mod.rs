mod git;
mod jj;

pub use git::Git;
pub use jj::Jujutsu;

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

/// File change status reported by the VCS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
}

impl FileStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            FileStatus::Modified => "M",
            FileStatus::Added => "A",
            FileStatus::Deleted => "D",
            FileStatus::Renamed => "R",
        }
    }

    /// Map a status column (`M`, `A`, `D`, `R100`, ...) to a status.
    /// Anything unrecognised is treated as a modification.
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => FileStatus::Added,
            Some('D') => FileStatus::Deleted,
            Some('R') => FileStatus::Renamed,
            _ => FileStatus::Modified,
        }
    }
}

/// A changed file in the working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
}

impl FileChange {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self { path: path.into(), status }
    }
}

/// The two capabilities the review UI needs from a version-control system.
///
/// Implementations are shared with background loader threads, so they must
/// be `Send + Sync` and must not hold any UI state.
pub trait Vcs: Send + Sync {
    /// Short name shown in the UI ("git" or "jj")
    fn name(&self) -> &'static str;

    /// Root directory the commands run in
    fn root(&self) -> &Path;

    /// Changed files, in the order the VCS reports them
    fn changed_files(&self) -> Result<Vec<FileChange>>;

    /// Unified diff text for a single path
    fn diff(&self, path: &str) -> Result<String>;
}

/// Find the VCS for `dir`, walking up through its ancestors.
/// At each level a `.jj` directory wins over `.git` (colocated repos are
/// reviewed through jj).
pub fn detect(dir: &Path) -> Result<Arc<dyn Vcs>> {
    let start = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory '{}'", dir.display()))?;

    for candidate in start.ancestors() {
        if candidate.join(".jj").exists() {
            log::info!("detected jj repository at {}", candidate.display());
            return Ok(Arc::new(Jujutsu::new(candidate.to_path_buf())));
        }
        if candidate.join(".git").exists() {
            log::info!("detected git repository at {}", candidate.display());
            return Ok(Arc::new(Git::new(candidate.to_path_buf())));
        }
    }

    anyhow::bail!("No VCS found (looking for .jj or .git in {})", start.display())
}

/// Run a VCS command in `root` and return stdout, failing with the trimmed
/// stderr when the command exits unsuccessfully.
pub(crate) fn run(program: &str, root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} {} failed: {}", program, args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── FileStatus ──

    #[test]
    fn status_from_plain_codes() {
        assert_eq!(FileStatus::from_code("M"), FileStatus::Modified);
        assert_eq!(FileStatus::from_code("A"), FileStatus::Added);
        assert_eq!(FileStatus::from_code("D"), FileStatus::Deleted);
    }

    #[test]
    fn status_from_rename_with_similarity_score() {
        assert_eq!(FileStatus::from_code("R100"), FileStatus::Renamed);
    }

    #[test]
    fn unknown_status_code_is_modified() {
        assert_eq!(FileStatus::from_code("T"), FileStatus::Modified);
        assert_eq!(FileStatus::from_code(""), FileStatus::Modified);
    }

    #[test]
    fn status_symbols() {
        assert_eq!(FileStatus::Modified.symbol(), "M");
        assert_eq!(FileStatus::Added.symbol(), "A");
        assert_eq!(FileStatus::Deleted.symbol(), "D");
        assert_eq!(FileStatus::Renamed.symbol(), "R");
    }

    // ── detect ──

    #[test]
    fn detect_finds_git() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let vcs = detect(dir.path()).unwrap();
        assert_eq!(vcs.name(), "git");
    }

    #[test]
    fn detect_prefers_jj_over_git() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::create_dir(dir.path().join(".jj")).unwrap();
        let vcs = detect(dir.path()).unwrap();
        assert_eq!(vcs.name(), "jj");
    }

    #[test]
    fn detect_walks_up_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        let vcs = detect(&nested).unwrap();
        assert_eq!(vcs.name(), "git");
        assert_eq!(vcs.root(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn detect_fails_without_repository() {
        let dir = tempfile::tempdir().unwrap();
        // Skip when the temp dir itself sits inside a checkout
        let has_ancestor_repo = dir
            .path()
            .ancestors()
            .any(|p| p.join(".git").exists() || p.join(".jj").exists());
        if !has_ancestor_repo {
            assert!(detect(dir.path()).is_err());
        }
    }
}
