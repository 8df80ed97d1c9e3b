use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The matching primitive cannot run at all (e.g. missing binary).
    /// The message is shown to the user as search status.
    #[error("{0}")]
    Unavailable(String),
    /// The primitive started but could not be driven for this input
    #[error("matcher failed: {0}")]
    Failed(String),
}

/// Finds the lines of one diff that contain a query.
///
/// Results are line indices in ascending order, each at most once, no
/// matter how the underlying mechanism ranks them. An empty query or an
/// empty body yields an empty result, never an error.
pub trait LineMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn match_lines(&self, query: &str, lines: &[&str]) -> Result<Vec<usize>, MatchError>;

    fn contains_match(&self, query: &str, lines: &[&str]) -> Result<bool, MatchError> {
        Ok(!self.match_lines(query, lines)?.is_empty())
    }
}

/// Which matcher implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// In-process substring containment
    #[default]
    Builtin,
    /// Exact-mode filtering through an external `fzf`
    Fzf,
}

pub fn build_matcher(kind: MatcherKind, case_sensitive: bool) -> Box<dyn LineMatcher> {
    match kind {
        MatcherKind::Builtin => Box::new(SubstringMatcher { case_sensitive }),
        MatcherKind::Fzf => Box::new(FzfMatcher::new()),
    }
}

// ── Builtin ──

#[derive(Debug, Clone, Copy)]
pub struct SubstringMatcher {
    pub case_sensitive: bool,
}

impl Default for SubstringMatcher {
    fn default() -> Self {
        Self { case_sensitive: true }
    }
}

impl LineMatcher for SubstringMatcher {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn match_lines(&self, query: &str, lines: &[&str]) -> Result<Vec<usize>, MatchError> {
        if query.is_empty() || lines.is_empty() {
            return Ok(Vec::new());
        }

        let matches = if self.case_sensitive {
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.contains(query))
                .map(|(i, _)| i)
                .collect()
        } else {
            let needle = query.to_lowercase();
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.to_lowercase().contains(&needle))
                .map(|(i, _)| i)
                .collect()
        };
        Ok(matches)
    }
}

// ── fzf ──

/// Runs `fzf --filter` in exact mode. Each line is fed as `<index>:<text>`
/// and only the text field is searched, so the index can be read back from
/// whatever order fzf ranks the results in.
#[derive(Debug, Default)]
pub struct FzfMatcher {
    binary: Option<PathBuf>,
}

impl FzfMatcher {
    pub fn new() -> Self {
        Self {
            binary: which::which("fzf").ok(),
        }
    }

    fn binary(&self) -> Result<PathBuf, MatchError> {
        match &self.binary {
            Some(path) => Ok(path.clone()),
            // Looked up again so installing fzf mid-session works
            None => which::which("fzf").map_err(|_| MatchError::Unavailable("fzf not found".into())),
        }
    }
}

impl LineMatcher for FzfMatcher {
    fn name(&self) -> &'static str {
        "fzf"
    }

    fn match_lines(&self, query: &str, lines: &[&str]) -> Result<Vec<usize>, MatchError> {
        if query.is_empty() || lines.is_empty() {
            return Ok(Vec::new());
        }
        let binary = self.binary()?;

        let mut input = String::new();
        for (i, line) in lines.iter().enumerate() {
            input.push_str(&i.to_string());
            input.push(':');
            input.push_str(line);
            input.push('\n');
        }

        let mut child = Command::new(&binary)
            .args(["--filter", query, "--exact", "--delimiter", ":", "--nth", "2.."])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MatchError::Failed(format!("failed to start fzf: {}", e)))?;

        // Feed stdin from a separate thread so a large diff can't deadlock
        // against fzf's stdout buffer
        let stdin = child.stdin.take();
        let writer = std::thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(input.as_bytes()) {
                    log::debug!("fzf: writing input failed: {}", e);
                }
            }
        });

        let output = child
            .wait_with_output()
            .map_err(|e| MatchError::Failed(format!("fzf did not finish: {}", e)))?;
        let _ = writer.join();

        // Exit 1 means "no match"; anything past that is a real failure
        match output.status.code() {
            Some(0) | Some(1) => {}
            other => {
                return Err(MatchError::Failed(format!("fzf exited with {:?}", other)));
            }
        }

        Ok(parse_indexed_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Read `<index>:<text>` rows back into a sorted, de-duplicated index list
pub(crate) fn parse_indexed_output(stdout: &str) -> Vec<usize> {
    let mut indices: Vec<usize> = stdout
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(idx, _)| idx.parse().ok())
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<&'static str> {
        vec![
            "package main",
            "",
            "func main() {",
            "    foo()",
            "}",
            "",
            "func foo() {",
            "}",
        ]
    }

    // ── SubstringMatcher ──

    #[test]
    fn finds_lines_containing_query() {
        let m = SubstringMatcher::default();
        assert_eq!(m.match_lines("foo", &sample()).unwrap(), vec![3, 6]);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let m = SubstringMatcher::default();
        assert!(m.match_lines("", &sample()).unwrap().is_empty());
    }

    #[test]
    fn empty_lines_match_nothing() {
        let m = SubstringMatcher::default();
        assert!(m.match_lines("foo", &[]).unwrap().is_empty());
    }

    #[test]
    fn repeated_occurrences_listed_once() {
        let m = SubstringMatcher::default();
        assert_eq!(m.match_lines("ab", &["abab ab", "x"]).unwrap(), vec![0]);
    }

    #[test]
    fn case_sensitive_by_default() {
        let m = SubstringMatcher::default();
        assert!(m.match_lines("FOO", &sample()).unwrap().is_empty());
    }

    #[test]
    fn case_insensitive_when_configured() {
        let m = SubstringMatcher { case_sensitive: false };
        assert_eq!(m.match_lines("FOO", &sample()).unwrap(), vec![3, 6]);
    }

    #[test]
    fn contains_match_reflects_results() {
        let m = SubstringMatcher::default();
        assert!(m.contains_match("main", &sample()).unwrap());
        assert!(!m.contains_match("zzz", &sample()).unwrap());
    }

    // ── fzf output parsing ──

    #[test]
    fn fzf_output_resorted_ascending() {
        let out = "6:func foo() {\n3:    foo()\n";
        assert_eq!(parse_indexed_output(out), vec![3, 6]);
    }

    #[test]
    fn fzf_output_keeps_colons_in_text() {
        assert_eq!(parse_indexed_output("2:a:b:c\n"), vec![2]);
    }

    #[test]
    fn fzf_output_ignores_garbage_rows() {
        assert_eq!(parse_indexed_output("x:1\n\n4:ok\nnocolon\n"), vec![4]);
    }

    #[test]
    fn fzf_short_circuits_on_empty_query() {
        let m = FzfMatcher { binary: None };
        assert_eq!(m.match_lines("", &sample()), Ok(Vec::new()));
    }

    #[test]
    fn build_matcher_picks_kind() {
        assert_eq!(build_matcher(MatcherKind::Builtin, true).name(), "builtin");
        assert_eq!(build_matcher(MatcherKind::Fzf, true).name(), "fzf");
    }
}
