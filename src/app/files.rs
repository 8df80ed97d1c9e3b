use crate::vcs::FileChange;

/// The changed-file list with an optional search filter.
///
/// Two coordinate spaces are in play: a *file index* is a position in the
/// full list, a *display index* is a position among the rows currently
/// shown. The cursor is always stored as a file index, so it survives the
/// filter changing underneath it.
#[derive(Debug, Default)]
pub struct FileListState {
    files: Vec<FileChange>,
    /// Strictly ascending, non-empty, every entry `< files.len()`
    filter: Option<Vec<usize>>,
    cursor: usize,
}

impl FileListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_files(&mut self, files: Vec<FileChange>) {
        self.files = files;
        self.filter = None;
        self.cursor = 0;
    }

    // ── Filter ──

    /// Install a filter. Out-of-range indices are dropped and the rest are
    /// sorted and de-duplicated; if nothing valid remains the filter is
    /// cleared. The cursor stays put when its file is still visible,
    /// otherwise it moves to the first visible file.
    pub fn set_filtered_indices(&mut self, indices: &[usize]) {
        let mut filter: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.files.len())
            .collect();
        filter.sort_unstable();
        filter.dedup();

        let Some(&first) = filter.first() else {
            self.clear_filter();
            return;
        };
        if filter.binary_search(&self.cursor).is_err() {
            self.cursor = first;
        }
        self.filter = Some(filter);
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    // ── Index translation ──

    pub fn display_index_to_file_index(&self, display: usize) -> Option<usize> {
        match &self.filter {
            Some(filter) => filter.get(display).copied(),
            None => (display < self.files.len()).then_some(display),
        }
    }

    /// None when `file` is out of range or hidden by the filter
    pub fn file_index_to_display_index(&self, file: usize) -> Option<usize> {
        match &self.filter {
            Some(filter) => filter.iter().position(|&i| i == file),
            None => (file < self.files.len()).then_some(file),
        }
    }

    // ── Cursor ──

    /// Cursor as a file index
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as a display index
    pub fn display_cursor(&self) -> Option<usize> {
        self.file_index_to_display_index(self.cursor)
    }

    /// Move up one visible row; clamps at the top. Returns true if moved.
    pub fn cursor_up(&mut self) -> bool {
        let Some(display) = self.display_cursor() else {
            return self.snap_to_first();
        };
        if display == 0 {
            return false;
        }
        self.move_to_display(display - 1)
    }

    /// Move down one visible row; clamps at the bottom. Returns true if moved.
    pub fn cursor_down(&mut self) -> bool {
        let Some(display) = self.display_cursor() else {
            return self.snap_to_first();
        };
        if display + 1 >= self.count() {
            return false;
        }
        self.move_to_display(display + 1)
    }

    fn move_to_display(&mut self, display: usize) -> bool {
        match self.display_index_to_file_index(display) {
            Some(file) if file != self.cursor => {
                self.cursor = file;
                true
            }
            _ => false,
        }
    }

    fn snap_to_first(&mut self) -> bool {
        match self.display_index_to_file_index(0) {
            Some(file) => {
                let moved = file != self.cursor;
                self.cursor = file;
                moved
            }
            None => false,
        }
    }

    /// Put the cursor on `path` if it is in the list
    pub fn select_path(&mut self, path: &str) -> bool {
        match self.files.iter().position(|f| f.path == path) {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&FileChange> {
        self.files.get(self.cursor)
    }

    // ── Counts and rows ──

    /// Number of visible files
    pub fn count(&self) -> usize {
        match &self.filter {
            Some(filter) => filter.len(),
            None => self.files.len(),
        }
    }

    pub fn total_count(&self) -> usize {
        self.files.len()
    }

    /// File at display row `display`
    pub fn visible_at(&self, display: usize) -> Option<(usize, &FileChange)> {
        let idx = self.display_index_to_file_index(display)?;
        self.files.get(idx).map(|f| (idx, f))
    }

    /// Paths in file-index order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }
}
