use super::cache::DiffCache;
use super::diff::DiffViewState;
use super::feedback::{line_number_at, FeedbackDraft};
use super::files::FileListState;
use super::loader::{self, AppEvent};
use crate::config::TcrConfig;
use crate::output;
use crate::search::{LineMatcher, SearchController};
use crate::vcs::Vcs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

/// Which input handler receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Feedback,
}

/// Main application state.
///
/// Owns the file list, the diff view, the search controller and the diff
/// cache, and keeps them consistent: every user action and every background
/// result goes through a method here, one at a time.
pub struct App {
    vcs: Arc<dyn Vcs>,
    matcher: Box<dyn LineMatcher>,

    pub files: FileListState,
    pub diff: DiffViewState,
    pub search: SearchController,
    pub cache: DiffCache,

    /// Sender handed to background loaders
    events: mpsc::Sender<AppEvent>,

    /// Bumped on every file-list (re)load; older results are discarded
    generation: u64,

    /// Background jobs whose event has not been handled yet
    in_flight: usize,

    preload_running: bool,

    /// Path of a single-file diff load that hasn't landed yet
    loading_diff: Option<String>,

    pub input_mode: InputMode,

    /// Comment being written in the feedback modal
    pub feedback: Option<FeedbackDraft>,

    /// Markdown file feedback is appended to
    pub output_path: PathBuf,

    /// One-line message replacing the hint bar until the next keystroke
    pub status_message: Option<String>,

    /// Corner notification, cleared after a few ticks
    pub notification: Option<String>,
    notification_ticks: u8,

    pub watching: bool,
    pub should_quit: bool,
    pub config: TcrConfig,
}

impl App {
    pub fn new(
        vcs: Arc<dyn Vcs>,
        matcher: Box<dyn LineMatcher>,
        config: TcrConfig,
        output_path: PathBuf,
        events: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            vcs,
            matcher,
            files: FileListState::new(),
            diff: DiffViewState::new(),
            search: SearchController::new(),
            cache: DiffCache::new(),
            events,
            generation: 0,
            in_flight: 0,
            preload_running: false,
            loading_diff: None,
            input_mode: InputMode::Normal,
            feedback: None,
            output_path,
            status_message: None,
            notification: None,
            notification_ticks: 0,
            watching: false,
            should_quit: false,
            config,
        }
    }

    pub fn vcs_name(&self) -> &'static str {
        self.vcs.name()
    }

    pub fn repo_root(&self) -> &Path {
        self.vcs.root()
    }

    pub fn matcher_name(&self) -> &'static str {
        self.matcher.name()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_diff_loading(&self) -> bool {
        self.loading_diff.is_some() && self.loading_diff.as_deref() == self.diff.path()
    }

    // ── Loading ──

    /// Start a fresh file-list load. Everything cached so far belongs to
    /// the previous load and is dropped.
    pub fn load_files(&mut self) {
        self.generation += 1;
        self.cache.clear();
        self.preload_running = false;
        self.loading_diff = None;
        self.in_flight += 1;
        loader::spawn_file_load(self.vcs.clone(), self.generation, self.events.clone());
    }

    pub fn reload(&mut self) {
        log::debug!("reloading file list");
        self.load_files();
    }

    /// Apply a background result
    pub fn handle_event(&mut self, event: AppEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            AppEvent::FilesLoaded { generation, result } => {
                if generation != self.generation {
                    return;
                }
                match result {
                    Ok(files) => self.install_files(files),
                    Err(e) => self.set_status(format!("Error: {:#}", e)),
                }
            }

            AppEvent::DiffLoaded {
                generation,
                path,
                result,
            } => {
                if generation != self.generation {
                    return;
                }
                if self.loading_diff.as_deref() == Some(path.as_str()) {
                    self.loading_diff = None;
                }
                match result {
                    Ok(diff) => {
                        self.cache.put(path.as_str(), diff);
                        if self.selected_path() == Some(path.as_str()) {
                            self.show_selected_file();
                        }
                    }
                    Err(e) => {
                        log::warn!("failed to load diff for {}: {:#}", path, e);
                        if self.selected_path() == Some(path.as_str()) {
                            self.set_status(format!("Error: {:#}", e));
                        }
                    }
                }
            }

            AppEvent::PreloadComplete {
                generation,
                diffs,
                failed,
            } => {
                if generation != self.generation {
                    return;
                }
                self.preload_running = false;
                let added = self.cache.merge_batch(diffs);
                log::debug!(
                    "preload merged {} diff(s), {} failed, {} cached",
                    added,
                    failed,
                    self.cache.len()
                );

                // A batch that lands after search was closed is only a cache fill.
                // The shown diff keeps its matches unless the selection moves.
                if self.search.is_active() && !self.search.query().is_empty() {
                    self.refilter_files();
                }
            }
        }
    }

    fn install_files(&mut self, files: Vec<crate::vcs::FileChange>) {
        let previous = self.diff.path().map(str::to_string);
        log::info!("loaded {} changed file(s) via {}", files.len(), self.vcs.name());

        // The shown content belongs to the previous load
        self.diff.clear();
        self.files.set_files(files);
        if let Some(prev) = previous {
            self.files.select_path(&prev);
        }

        if self.search.is_active() {
            self.start_preload();
            if !self.search.query().is_empty() {
                self.run_search();
                return;
            }
        }
        self.show_selected_file();
    }

    fn selected_path(&self) -> Option<&str> {
        self.files.selected().map(|f| f.path.as_str())
    }

    /// Show the diff of the file under the cursor, from cache when possible.
    /// While searching, its matches are recomputed against the current query.
    pub fn show_selected_file(&mut self) {
        let Some(path) = self.selected_path().map(str::to_string) else {
            self.diff.clear();
            return;
        };

        match self.cache.get(&path) {
            Some(diff) => {
                let diff = diff.to_string();
                self.diff.set_diff(&path, diff);
                self.refresh_diff_matches();
            }
            None => {
                self.diff.set_diff(&path, String::new());
                if self.loading_diff.as_deref() != Some(path.as_str()) {
                    self.loading_diff = Some(path.clone());
                    self.in_flight += 1;
                    loader::spawn_diff_load(
                        self.vcs.clone(),
                        self.generation,
                        path,
                        self.events.clone(),
                    );
                }
            }
        }
    }

    // ── File navigation ──

    pub fn next_file(&mut self) {
        if self.files.cursor_down() {
            self.show_selected_file();
        }
    }

    pub fn prev_file(&mut self) {
        if self.files.cursor_up() {
            self.show_selected_file();
        }
    }

    // ── Search ──

    /// Open the search bar and start filling the cache in the background
    pub fn start_search(&mut self) {
        self.search.activate();
        self.diff.clear_search_matches();
        self.files.clear_filter();
        self.input_mode = InputMode::Search;
        self.start_preload();
    }

    /// Close the search bar and restore the unfiltered view
    pub fn stop_search(&mut self) {
        self.search.deactivate();
        self.files.clear_filter();
        self.diff.clear_search_matches();
        self.input_mode = InputMode::Normal;
    }

    pub fn search_push_char(&mut self, c: char) {
        self.search.push_char(c);
        self.run_search();
    }

    pub fn search_pop_char(&mut self) {
        if self.search.pop_char() {
            self.run_search();
        }
    }

    pub fn next_match(&mut self) {
        self.diff.next_match();
    }

    pub fn prev_match(&mut self) {
        self.diff.prev_match();
    }

    fn start_preload(&mut self) {
        if self.preload_running {
            return;
        }
        let missing = self.cache.missing(self.files.paths());
        if missing.is_empty() {
            return;
        }
        log::info!("preloading {} diff(s) for search", missing.len());
        self.preload_running = true;
        self.in_flight += 1;
        loader::spawn_preload(
            self.vcs.clone(),
            self.generation,
            missing,
            self.events.clone(),
        );
    }

    /// Re-run the cross-file search, then bring the file filter and the
    /// displayed diff's matches in line.
    fn run_search(&mut self) {
        if !self.refilter_files() {
            self.refresh_diff_matches();
        }
    }

    /// Re-run the cross-file search over whatever is cached right now and
    /// apply the file filter. Returns true if the selection moved and the
    /// newly selected diff was shown.
    fn refilter_files(&mut self) -> bool {
        let query = self.search.query().to_string();
        self.search.search_all_files(
            &query,
            self.files.paths(),
            &self.cache,
            self.matcher.as_ref(),
        );

        let before = self.files.cursor();
        match self.search.filtered_indices() {
            Some(indices) => self.files.set_filtered_indices(indices),
            None => self.files.clear_filter(),
        }

        if self.files.cursor() != before || self.diff.path() != self.selected_path() {
            self.show_selected_file();
            true
        } else {
            false
        }
    }

    /// Recompute the match set of the displayed diff only
    fn refresh_diff_matches(&mut self) {
        if !self.search.is_active() || self.search.query().is_empty() {
            self.diff.clear_search_matches();
            return;
        }
        let query = self.search.query().to_string();
        let lines = self.diff.line_refs();
        let matches = self
            .search
            .search_in_diff(&query, &lines, self.matcher.as_ref());
        self.diff.set_search_matches(matches);
    }

    // ── Feedback ──

    /// Open the feedback modal on the diff cursor line
    pub fn open_feedback(&mut self) {
        let Some(path) = self.diff.path() else {
            return;
        };
        if self.diff.is_empty() {
            return;
        }
        let line = line_number_at(self.diff.lines(), self.diff.cursor());
        let text = self.diff.current_line().unwrap_or_default();
        self.feedback = Some(FeedbackDraft::new(path, line, text));
        self.input_mode = InputMode::Feedback;
    }

    pub fn feedback_push_char(&mut self, c: char) {
        if let Some(draft) = self.feedback.as_mut() {
            draft.comment.push(c);
        }
    }

    pub fn feedback_pop_char(&mut self) {
        if let Some(draft) = self.feedback.as_mut() {
            draft.comment.pop();
        }
    }

    /// Write the draft; a blank comment counts as cancel
    pub fn submit_feedback(&mut self) {
        let Some(draft) = self.feedback.take() else {
            return;
        };
        self.input_mode = self.mode_after_modal();
        if draft.is_blank() {
            return;
        }
        match output::append_feedback(&self.output_path, &draft.path, draft.line, &draft.comment) {
            Ok(()) => self.set_status("Feedback saved".to_string()),
            Err(e) => self.set_status(format!("Error: {:#}", e)),
        }
    }

    pub fn cancel_feedback(&mut self) {
        self.feedback = None;
        self.input_mode = self.mode_after_modal();
    }

    fn mode_after_modal(&self) -> InputMode {
        if self.search.is_active() {
            InputMode::Search
        } else {
            InputMode::Normal
        }
    }

    // ── Messages ──

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some(msg);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn notify(&mut self, msg: &str) {
        self.notification = Some(msg.to_string());
        self.notification_ticks = 0;
    }

    /// Called on every event loop iteration; clears stale notifications
    pub fn tick(&mut self) {
        if self.notification.is_some() {
            self.notification_ticks += 1;
            if self.notification_ticks > 20 {
                self.notification = None;
                self.notification_ticks = 0;
            }
        }
    }
}
