use super::{run, FileChange, FileStatus, Vcs};
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Git working copy: staged changes first, then unstaged ones
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Vcs for Git {
    fn name(&self) -> &'static str {
        "git"
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn changed_files(&self) -> Result<Vec<FileChange>> {
        let staged_raw = run("git", &self.root, &["diff", "--cached", "--name-status"])?;
        let unstaged_raw = run("git", &self.root, &["diff", "--name-status"])?;

        let mut changes = parse_name_status(&staged_raw);
        let staged: HashSet<String> = changes.iter().map(|c| c.path.clone()).collect();
        changes.extend(
            parse_name_status(&unstaged_raw)
                .into_iter()
                .filter(|c| !staged.contains(&c.path)),
        );
        Ok(changes)
    }

    /// Staged diff followed by the unstaged diff for `path`. Only fails when
    /// both commands fail and nothing was produced.
    fn diff(&self, path: &str) -> Result<String> {
        let staged = run(
            "git",
            &self.root,
            &["diff", "--cached", "--no-color", "--no-ext-diff", "--", path],
        );
        let unstaged = run(
            "git",
            &self.root,
            &["diff", "--no-color", "--no-ext-diff", "--", path],
        );

        match (staged, unstaged) {
            (Err(staged_err), Err(unstaged_err)) => {
                anyhow::bail!(
                    "git diff failed: staged diff: {}; unstaged diff: {}",
                    staged_err,
                    unstaged_err
                )
            }
            (staged, unstaged) => {
                let mut out = staged.unwrap_or_default();
                out.push_str(&unstaged.unwrap_or_default());
                Ok(out)
            }
        }
    }
}

/// Parse `git diff --name-status` output.
///
/// Rows are `<status>\t<path>`; renames and copies carry two paths
/// (`R100\told\tnew`), in which case the new path is reported.
pub(crate) fn parse_name_status(raw: &str) -> Vec<FileChange> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                return None;
            }
            let mut fields = line.split('\t');
            let code = fields.next()?.trim();
            let path = fields.last()?.trim();
            if path.is_empty() {
                return None;
            }
            Some(FileChange::new(path, FileStatus::from_code(code)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_name_status() {
        let raw = "M\tsrc/main.rs\nA\tsrc/new.rs\nD\told.txt\n";
        let files = parse_name_status(raw);
        assert_eq!(
            files,
            vec![
                FileChange::new("src/main.rs", FileStatus::Modified),
                FileChange::new("src/new.rs", FileStatus::Added),
                FileChange::new("old.txt", FileStatus::Deleted),
            ]
        );
    }

    #[test]
    fn rename_reports_new_path() {
        let files = parse_name_status("R100\tsrc/old.rs\tsrc/new.rs\n");
        assert_eq!(files, vec![FileChange::new("src/new.rs", FileStatus::Renamed)]);
    }

    #[test]
    fn blank_and_malformed_lines_skipped() {
        let files = parse_name_status("\nM\n\nM\tkeep.rs\n");
        assert_eq!(files, vec![FileChange::new("keep.rs", FileStatus::Modified)]);
    }

    #[test]
    fn path_with_spaces_preserved() {
        let files = parse_name_status("M\tdocs/my notes.md\n");
        assert_eq!(files[0].path, "docs/my notes.md");
    }

    #[test]
    fn empty_output_means_no_changes() {
        assert!(parse_name_status("").is_empty());
    }
}
