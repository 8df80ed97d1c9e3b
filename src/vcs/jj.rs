use super::{run, FileChange, FileStatus, Vcs};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Nearest bookmarked ancestor of the working copy, falling back to trunk()
const BASE_REVSET: &str = "coalesce(heads(::@ & bookmarks()), trunk())";

const BASE_HINT: &str =
    "Hint: Create a bookmark at your branch point, or ensure a 'main', 'master', or 'trunk' bookmark exists";

/// Jujutsu working copy, diffed against its base revision
pub struct Jujutsu {
    root: PathBuf,
    /// Resolved once per session; failures are cached too
    base: OnceLock<std::result::Result<String, String>>,
}

impl Jujutsu {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            base: OnceLock::new(),
        }
    }

    fn base(&self) -> Result<&str> {
        let resolved = self.base.get_or_init(|| self.resolve_base());
        match resolved {
            Ok(rev) => Ok(rev.as_str()),
            Err(msg) => Err(anyhow::anyhow!("{}", msg)),
        }
    }

    fn resolve_base(&self) -> std::result::Result<String, String> {
        let out = run(
            "jj",
            &self.root,
            &[
                "log", "-r", BASE_REVSET, "-T", "commit_id", "--no-graph", "--limit", "1",
            ],
        )
        .map_err(|e| format!("failed to resolve base revision: {}\n{}", e, BASE_HINT))?;

        let commit = out.trim();
        if commit.is_empty() {
            return Err(format!(
                "no base revision found: no bookmarks in ancestry and trunk() not found\n{}",
                BASE_HINT
            ));
        }
        log::debug!("jj base revision {}", commit);
        Ok(commit.to_string())
    }
}

impl Vcs for Jujutsu {
    fn name(&self) -> &'static str {
        "jj"
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn changed_files(&self) -> Result<Vec<FileChange>> {
        let base = self.base()?;
        let raw = run(
            "jj",
            &self.root,
            &["diff", "--from", base, "--to", "@", "--summary", "--color", "never"],
        )?;
        Ok(parse_summary(&raw))
    }

    fn diff(&self, path: &str) -> Result<String> {
        let base = self.base()?;
        run(
            "jj",
            &self.root,
            &["diff", "--from", base, "--to", "@", "--git", "--color", "never", path],
        )
    }
}

/// Parse `jj diff --summary` output: `<status> <path>` per row.
/// Renames use brace notation (`R src/{a.rs => b.rs}`) and report the new path.
pub(crate) fn parse_summary(raw: &str) -> Vec<FileChange> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let (code, path) = line.split_once(' ')?;
            let path = path.trim();
            if path.is_empty() {
                return None;
            }
            Some(FileChange::new(resolve_rename(path), FileStatus::from_code(code)))
        })
        .collect()
}

fn resolve_rename(path: &str) -> String {
    let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) else {
        return path.to_string();
    };
    if close < open {
        return path.to_string();
    }
    let inner = &path[open + 1..close];
    let Some((_, new)) = inner.split_once(" => ") else {
        return path.to_string();
    };
    let joined = format!("{}{}{}", &path[..open], new, &path[close + 1..]);
    // `{old => }` collapses a directory level and leaves a double slash
    joined.replace("//", "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_rows() {
        let raw = "M src/lib.rs\nA README.md\nD gone.txt\n";
        assert_eq!(
            parse_summary(raw),
            vec![
                FileChange::new("src/lib.rs", FileStatus::Modified),
                FileChange::new("README.md", FileStatus::Added),
                FileChange::new("gone.txt", FileStatus::Deleted),
            ]
        );
    }

    #[test]
    fn rename_with_braces_reports_new_path() {
        let files = parse_summary("R src/{old.rs => new.rs}\n");
        assert_eq!(files, vec![FileChange::new("src/new.rs", FileStatus::Renamed)]);
    }

    #[test]
    fn rename_across_directories() {
        let files = parse_summary("R {a => b}/mod.rs\n");
        assert_eq!(files[0].path, "b/mod.rs");
    }

    #[test]
    fn rename_dropping_directory_level() {
        let files = parse_summary("R src/{util => }/x.rs\n");
        assert_eq!(files[0].path, "src/x.rs");
    }

    #[test]
    fn summary_skips_blank_and_bare_status_lines() {
        assert_eq!(
            parse_summary("\nM\nM  \nA ok.rs\n"),
            vec![FileChange::new("ok.rs", FileStatus::Added)]
        );
    }

    #[test]
    fn path_with_spaces_preserved() {
        let files = parse_summary("M notes/to do.md\n");
        assert_eq!(files[0].path, "notes/to do.md");
    }
}
