use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use super::styles;
use crate::app::{App, DiffViewState};

/// How a raw diff line is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRole {
    FileHeader,
    Hunk,
    Add,
    Delete,
    Context,
}

fn classify(line: &str) -> LineRole {
    if line.starts_with("diff ")
        || line.starts_with("index ")
        || line.starts_with("+++ ")
        || line.starts_with("--- ")
    {
        LineRole::FileHeader
    } else if line.starts_with("@@") {
        LineRole::Hunk
    } else if line.starts_with('+') {
        LineRole::Add
    } else if line.starts_with('-') {
        LineRole::Delete
    } else {
        LineRole::Context
    }
}

fn role_style(role: LineRole) -> Style {
    match role {
        LineRole::FileHeader => styles::file_header_style(),
        LineRole::Hunk => styles::hunk_header_style(),
        LineRole::Add => styles::add_style(),
        LineRole::Delete => styles::del_style(),
        LineRole::Context => styles::default_style(),
    }
}

/// Style for diff line `idx`: search matches take over from the cursor
/// highlight while there are any
fn line_style(view: &DiffViewState, idx: usize, line: &str) -> Style {
    if view.has_matches() {
        if view.is_current_match(idx) {
            return styles::current_match_style();
        }
        if view.is_line_matched(idx) {
            return styles::match_style();
        }
    } else if idx == view.cursor() {
        return styles::cursor_line_style();
    }
    role_style(classify(line))
}

/// Rows available for diff lines in a diff panel of `area`
pub fn content_height(area: Rect, searching: bool) -> usize {
    let rows = area.height.saturating_sub(1); // title
    let rows = if searching { rows.saturating_sub(1) } else { rows };
    rows.max(1) as usize
}

/// Render the diff panel (right side)
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let searching = app.search.is_active();
    let (diff_area, search_area) = if searching {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        (parts[0], Some(parts[1]))
    } else {
        (area, None)
    };

    let view = &app.diff;
    match view.path() {
        None => render_empty(f, diff_area),
        Some(path) => {
            let title = format!(" {} ", path);
            let height = content_height(area, searching);

            let lines: Vec<Line> = if view.is_empty() {
                let msg = if app.is_diff_loading() {
                    "  Loading diff…"
                } else {
                    "  (no diff)"
                };
                vec![Line::from(Span::styled(msg, Style::default().fg(styles::MUTED)))]
            } else {
                view.lines()
                    .iter()
                    .enumerate()
                    .skip(view.scroll())
                    .take(height)
                    .map(|(idx, line)| {
                        Line::from(Span::raw(line.as_str())).style(line_style(view, idx, line))
                    })
                    .collect()
            };

            let block = Block::default()
                .title(Span::styled(title, Style::default().fg(styles::BRIGHT)))
                .borders(Borders::NONE)
                .style(Style::default().bg(styles::BG))
                .padding(Padding::new(1, 1, 0, 0));

            f.render_widget(Paragraph::new(lines).block(block), diff_area);
        }
    }

    if let Some(search_area) = search_area {
        super::status_bar::render_search_bar(f, search_area, app);
    }
}

fn render_empty(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(styles::BG));

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "  No file selected",
            Style::default().fg(styles::MUTED),
        )),
    ])
    .block(block);

    f.render_widget(text, area);
}
