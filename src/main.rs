mod app;
mod config;
mod output;
mod search;
mod ui;
mod vcs;
mod watch;

use anyhow::{Context, Result};
use app::{App, AppEvent, InputMode};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use search::MatcherKind;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use watch::{FileWatcher, WatchEvent};

/// Terminal code review for git and jj working copies
#[derive(Parser)]
#[command(name = "tcr", version, about)]
struct Cli {
    /// Markdown file feedback is appended to (defaults to a new temp file)
    output: Option<PathBuf>,

    /// Line matcher used by search
    #[arg(long, value_enum)]
    matcher: Option<MatcherKind>,

    /// Reload automatically when files change
    #[arg(long)]
    watch: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', value_name = "DIR")]
    dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let output_path = match cli.output {
        Some(path) => path,
        None => {
            let path = output::default_output_path();
            eprintln!("feedback: {}", path.display());
            path
        }
    };
    output::validate_output_path(&output_path)?;

    let start_dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let vcs = vcs::detect(&start_dir)?;
    log::info!("{} repository at {}", vcs.name(), vcs.root().display());

    let mut config = config::load_config(vcs.root());
    if let Some(kind) = cli.matcher {
        config.search.matcher = kind;
    }
    if cli.watch {
        config.watch.enabled = true;
    }
    let matcher = search::build_matcher(config.search.matcher, config.search.case_sensitive);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let mut app = App::new(vcs, matcher, config, output_path, event_tx);
    app.load_files();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, event_rx);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Logging is off unless `TCR_LOG` names a file; the terminal belongs to
/// the UI. Level comes from `RUST_LOG`, default info.
fn init_logging() {
    let Some(path) = std::env::var_os("TCR_LOG") else {
        return;
    };
    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("tcr: cannot open log file {:?}: {}", path, e);
            return;
        }
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
}

/// Owns the optional file watcher and the channel it reports on
struct Watch {
    tx: mpsc::Sender<WatchEvent>,
    rx: mpsc::Receiver<WatchEvent>,
    watcher: Option<FileWatcher>,
}

impl Watch {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, watcher: None }
    }

    fn start(&mut self, app: &mut App) {
        let ignored = vec![app.output_path.clone()];
        match FileWatcher::new(
            app.repo_root(),
            app.config.watch.debounce_ms,
            ignored,
            self.tx.clone(),
        ) {
            Ok(w) => {
                self.watcher = Some(w);
                app.watching = true;
                app.notify("Watching for changes...");
            }
            Err(e) => {
                log::warn!("failed to start watcher: {:#}", e);
                app.notify(&format!("Watch error: {}", e));
            }
        }
    }

    fn stop(&mut self, app: &mut App) {
        self.watcher = None;
        app.watching = false;
        app.notify("Watch stopped");
    }

    fn toggle(&mut self, app: &mut App) {
        if self.watcher.is_some() {
            self.stop(app);
        } else {
            self.start(app);
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let mut watch = Watch::new();
    if app.config.watch.enabled {
        watch.start(app);
    }

    // Watch-triggered reloads are coalesced
    let mut pending_reload = false;
    let mut reload_deadline = Instant::now();
    let mut pending_file_count = 0usize;

    loop {
        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let viewport = ui::diff_viewport_height(area, app);
        app.diff.set_viewport_height(viewport);

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key, &mut watch);
                }
            }
        }

        // Background results, applied one at a time on this thread
        while let Ok(ev) = events.try_recv() {
            app.handle_event(ev);
        }

        while let Ok(WatchEvent::FilesChanged(paths)) = watch.rx.try_recv() {
            pending_file_count += paths.len();
            pending_reload = true;
            reload_deadline = Instant::now() + Duration::from_millis(200);
        }

        if pending_reload && Instant::now() >= reload_deadline {
            pending_reload = false;
            let count = std::mem::take(&mut pending_file_count);
            app.reload();
            app.notify(&format!(
                "{} file{} changed",
                count,
                if count == 1 { "" } else { "s" }
            ));
        }

        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, watch: &mut Watch) {
    // Any keystroke dismisses the transient status line
    app.clear_status();

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_input(app, key, watch),
        InputMode::Search => handle_search_input(app, key),
        InputMode::Feedback => handle_feedback_input(app, key),
    }
}

/// Diff-cursor movement shared by normal and search mode.
/// Returns true if the key was consumed.
fn handle_diff_motion(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('v') if ctrl => app.diff.page_down(),
        KeyCode::Char('v') if alt => app.diff.page_up(),
        KeyCode::PageDown => app.diff.page_down(),
        KeyCode::PageUp => app.diff.page_up(),
        KeyCode::Char('<') if alt => app.diff.goto_top(),
        KeyCode::Char('>') if alt => app.diff.goto_bottom(),
        _ => return false,
    }
    true
}

fn handle_normal_input(app: &mut App, key: KeyEvent, watch: &mut Watch) {
    if handle_diff_motion(app, key) {
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up => app.prev_file(),
        KeyCode::Down => app.next_file(),
        KeyCode::Char('n') if ctrl => app.diff.cursor_down(),
        KeyCode::Char('p') if ctrl => app.diff.cursor_up(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Enter => app.open_feedback(),
        KeyCode::Char('r') => {
            app.reload();
            app.notify("Reloading...");
        }
        KeyCode::Char('w') => watch.toggle(app),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    if handle_diff_motion(app, key) {
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.stop_search(),
        KeyCode::Enter => app.next_match(),
        KeyCode::Char('n') if ctrl => app.next_match(),
        KeyCode::Char('p') if ctrl => app.prev_match(),
        KeyCode::Up => app.prev_file(),
        KeyCode::Down => app.next_file(),
        KeyCode::Backspace => app.search_pop_char(),
        KeyCode::Char(_) => {
            if let Some(c) = typed_char(key) {
                app.search_push_char(c);
            }
        }
        _ => {}
    }
}

fn handle_feedback_input(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.cancel_feedback(),
        KeyCode::Enter => app.submit_feedback(),
        KeyCode::Char('j') if ctrl => app.feedback_push_char('\n'),
        KeyCode::Backspace => app.feedback_pop_char(),
        KeyCode::Char(_) => {
            if let Some(c) = typed_char(key) {
                app.feedback_push_char(c);
            }
        }
        _ => {}
    }
}

/// A plain character for text input; Ctrl and Alt chords are commands
fn typed_char(key: KeyEvent) -> Option<char> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}
