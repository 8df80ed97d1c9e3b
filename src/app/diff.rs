use std::collections::HashSet;

const DEFAULT_VIEWPORT: usize = 20;

/// The displayed diff: its lines, the line cursor, the scroll offset, and
/// the match set of the active search against this diff only.
#[derive(Debug)]
pub struct DiffViewState {
    path: Option<String>,
    lines: Vec<String>,
    cursor: usize,
    scroll: usize,
    viewport_height: usize,

    // ── Search matches ──
    matches: Vec<usize>,
    match_set: HashSet<usize>,
    current_match: Option<usize>,
}

impl Default for DiffViewState {
    fn default() -> Self {
        Self {
            path: None,
            lines: Vec::new(),
            cursor: 0,
            scroll: 0,
            viewport_height: DEFAULT_VIEWPORT,
            matches: Vec::new(),
            match_set: HashSet::new(),
            current_match: None,
        }
    }
}

impl DiffViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a new diff. The cursor returns to the top and any match data
    /// for the previous diff is dropped; matches are not recomputed here.
    pub fn set_diff(&mut self, path: &str, content: String) {
        self.path = Some(path.to_string());
        self.lines = content.lines().map(str::to_string).collect();
        self.cursor = 0;
        self.scroll = 0;
        self.clear_search_matches();
    }

    /// Back to the "nothing selected" state
    pub fn clear(&mut self) {
        self.path = None;
        self.lines.clear();
        self.cursor = 0;
        self.scroll = 0;
        self.clear_search_matches();
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Borrowed lines, in the shape the matcher takes
    pub fn line_refs(&self) -> Vec<&str> {
        self.lines.iter().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    // ── Cursor & scroll ──

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_line(&self) -> Option<&str> {
        self.lines.get(self.cursor).map(String::as_str)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.ensure_cursor_visible();
    }

    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.lines.len() {
            self.cursor += 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn page_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.viewport_height);
        self.ensure_cursor_visible();
    }

    pub fn page_down(&mut self) {
        self.cursor = (self.cursor + self.viewport_height).min(self.last_line());
        self.ensure_cursor_visible();
    }

    pub fn goto_top(&mut self) {
        self.cursor = 0;
        self.scroll = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.cursor = self.last_line();
        self.ensure_cursor_visible();
    }

    fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    fn ensure_cursor_visible(&mut self) {
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + self.viewport_height {
            self.scroll = self.cursor + 1 - self.viewport_height;
        }
    }

    // ── Search matches ──

    /// Install the match set for this diff. Lines outside the diff are
    /// ignored. A non-empty set selects its first match and moves the
    /// cursor there; an empty set leaves the cursor alone.
    pub fn set_search_matches(&mut self, matches: Vec<usize>) {
        let mut matches: Vec<usize> = matches
            .into_iter()
            .filter(|&l| l < self.lines.len())
            .collect();
        matches.sort_unstable();
        matches.dedup();

        self.match_set = matches.iter().copied().collect();
        self.matches = matches;

        match self.matches.first() {
            Some(&first) => {
                self.current_match = Some(0);
                self.cursor = first;
                self.ensure_cursor_visible();
            }
            None => self.current_match = None,
        }
    }

    pub fn clear_search_matches(&mut self) {
        self.matches.clear();
        self.match_set.clear();
        self.current_match = None;
    }

    /// Advance to the next match, wrapping past the last one
    pub fn next_match(&mut self) -> bool {
        let n = self.matches.len();
        if n == 0 {
            return false;
        }
        let next = match self.current_match {
            Some(i) => (i + 1) % n,
            None => 0,
        };
        self.jump_to_match(next);
        true
    }

    /// Step back to the previous match, wrapping before the first one
    pub fn prev_match(&mut self) -> bool {
        let n = self.matches.len();
        if n == 0 {
            return false;
        }
        let prev = match self.current_match {
            Some(0) | None => n - 1,
            Some(i) => i - 1,
        };
        self.jump_to_match(prev);
        true
    }

    fn jump_to_match(&mut self, idx: usize) {
        self.current_match = Some(idx);
        self.cursor = self.matches[idx];
        self.ensure_cursor_visible();
    }

    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn current_match(&self) -> Option<usize> {
        self.current_match
    }

    pub fn current_match_line(&self) -> Option<usize> {
        self.current_match.and_then(|i| self.matches.get(i).copied())
    }

    pub fn is_line_matched(&self, line: usize) -> bool {
        self.match_set.contains(&line)
    }

    pub fn is_current_match(&self, line: usize) -> bool {
        self.current_match_line() == Some(line)
    }

    pub fn match_status(&self) -> String {
        match self.current_match {
            Some(i) if !self.matches.is_empty() => format!("{}/{}", i + 1, self.matches.len()),
            _ => "no matches".to_string(),
        }
    }
}
