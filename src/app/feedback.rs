/// A comment being composed against one diff line
#[derive(Debug, Clone)]
pub struct FeedbackDraft {
    pub path: String,
    /// New-side line number, None for header lines
    pub line: Option<usize>,
    /// The diff line the comment was opened on
    pub line_text: String,
    pub comment: String,
}

impl FeedbackDraft {
    pub fn new(path: &str, line: Option<usize>, line_text: &str) -> Self {
        Self {
            path: path.to_string(),
            line,
            line_text: line_text.to_string(),
            comment: String::new(),
        }
    }

    /// `@path:line`, or `@path` when the line has no number
    pub fn anchor(&self) -> String {
        match self.line {
            Some(n) => format!("@{}:{}", self.path, n),
            None => format!("@{}", self.path),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.comment.trim().is_empty()
    }
}

/// Resolve the diff line at `cursor` to a line number in the new file.
///
/// Added and context lines map to their own new-side number; a removed
/// line maps to the new-side position it was removed before. File headers,
/// hunk headers and `\ No newline` markers have no number.
pub fn line_number_at<S: AsRef<str>>(lines: &[S], cursor: usize) -> Option<usize> {
    if cursor >= lines.len() {
        return None;
    }

    let mut in_hunk = false;
    let mut next_new = 0usize;

    for (idx, line) in lines.iter().enumerate().take(cursor + 1) {
        let line = line.as_ref();
        let is_target = idx == cursor;

        if line.starts_with("diff ") {
            in_hunk = false;
            if is_target {
                return None;
            }
            continue;
        }
        if line.starts_with("@@") {
            match parse_new_start(line) {
                Some(start) => {
                    in_hunk = true;
                    next_new = start;
                }
                None => in_hunk = false,
            }
            if is_target {
                return None;
            }
            continue;
        }
        if !in_hunk {
            if is_target {
                return None;
            }
            continue;
        }

        let number = match line.chars().next() {
            Some('+') | Some(' ') | None => {
                let n = next_new;
                next_new += 1;
                Some(n)
            }
            Some('-') => Some(next_new),
            _ => None,
        };
        if is_target {
            return number.filter(|&n| n > 0);
        }
    }
    None
}

/// New-side start from `@@ -a,b +c,d @@ ...`
fn parse_new_start(header: &str) -> Option<usize> {
    let after = header.strip_prefix("@@ ")?;
    let end = after.find(" @@")?;
    let new_range = after[..end]
        .split_whitespace()
        .find_map(|part| part.strip_prefix('+'))?;
    let start = match new_range.split_once(',') {
        Some((start, _)) => start,
        None => new_range,
    };
    start.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@ fn main()
 fn main() {
+    println!(\"hello\");
     let x = 1;
-    let y = 2;
 }";

    fn lines() -> Vec<&'static str> {
        DIFF.lines().collect()
    }

    // ── line_number_at ──

    #[test]
    fn headers_have_no_line_number() {
        let l = lines();
        for i in 0..5 {
            assert_eq!(line_number_at(&l, i), None, "line {}", i);
        }
    }

    #[test]
    fn context_and_added_lines_use_new_side() {
        let l = lines();
        assert_eq!(line_number_at(&l, 5), Some(1));
        assert_eq!(line_number_at(&l, 6), Some(2));
        assert_eq!(line_number_at(&l, 7), Some(3));
    }

    #[test]
    fn removed_line_maps_to_following_new_line() {
        let l = lines();
        assert_eq!(line_number_at(&l, 8), Some(4));
        assert_eq!(line_number_at(&l, 9), Some(4));
    }

    #[test]
    fn second_hunk_restarts_numbering() {
        let diff = "@@ -1,2 +1,2 @@\n a\n-b\n+c\n@@ -40 +40,2 @@\n x\n+y";
        let l: Vec<&str> = diff.lines().collect();
        assert_eq!(line_number_at(&l, 3), Some(2));
        assert_eq!(line_number_at(&l, 5), Some(40));
        assert_eq!(line_number_at(&l, 6), Some(41));
    }

    #[test]
    fn concatenated_diffs_reset_at_file_header() {
        let diff = "@@ -1 +1 @@\n+a\ndiff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -5 +5 @@\n+b";
        let l: Vec<&str> = diff.lines().collect();
        assert_eq!(line_number_at(&l, 1), Some(1));
        assert_eq!(line_number_at(&l, 3), None);
        assert_eq!(line_number_at(&l, 4), None);
        assert_eq!(line_number_at(&l, 6), Some(5));
    }

    #[test]
    fn deleted_file_has_no_line_number() {
        let diff = "@@ -1,2 +0,0 @@\n-a\n-b";
        let l: Vec<&str> = diff.lines().collect();
        assert_eq!(line_number_at(&l, 1), None);
    }

    #[test]
    fn no_newline_marker_has_no_number() {
        let diff = "@@ -1 +1 @@\n-a\n+b\n\\ No newline at end of file";
        let l: Vec<&str> = diff.lines().collect();
        assert_eq!(line_number_at(&l, 3), None);
    }

    #[test]
    fn cursor_past_end_is_none() {
        assert_eq!(line_number_at(&lines(), 99), None);
        assert_eq!(line_number_at::<&str>(&[], 0), None);
    }

    // ── FeedbackDraft ──

    #[test]
    fn anchor_with_and_without_line() {
        assert_eq!(FeedbackDraft::new("a.rs", Some(7), "").anchor(), "@a.rs:7");
        assert_eq!(FeedbackDraft::new("a.rs", None, "").anchor(), "@a.rs");
    }

    #[test]
    fn whitespace_only_comment_is_blank() {
        let mut d = FeedbackDraft::new("a.rs", Some(1), "+x");
        d.comment.push_str("  \n ");
        assert!(d.is_blank());
        d.comment.push('k');
        assert!(!d.is_blank());
    }
}
