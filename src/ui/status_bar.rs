use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::styles;
use crate::app::{App, InputMode};

struct Hint {
    key: &'static str,
    label: &'static str,
}

impl Hint {
    const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }

    fn width(&self) -> usize {
        self.key.chars().count() + self.label.chars().count()
    }
}

const NORMAL_HINTS: &[Hint] = &[
    Hint::new("↑/↓", " files  "),
    Hint::new("^N/^P", " line  "),
    Hint::new("^V/M-V", " page  "),
    Hint::new("/", " search  "),
    Hint::new("Enter", " feedback  "),
    Hint::new("r", " reload  "),
    Hint::new("w", " watch  "),
    Hint::new("q", " quit"),
];

const SEARCH_HINTS: &[Hint] = &[
    Hint::new("type", " query  "),
    Hint::new("↑/↓", " files  "),
    Hint::new("Enter/^N", " next  "),
    Hint::new("^P", " prev  "),
    Hint::new("Esc", " close"),
];

const FEEDBACK_HINTS: &[Hint] = &[
    Hint::new("Enter", " save  "),
    Hint::new("^J", " newline  "),
    Hint::new("Esc", " cancel"),
];

/// Lay hints out on one row; whatever doesn't fit is dropped
fn hint_line(hints: &[Hint], width: usize) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    let mut used = 1;
    for hint in hints {
        if used + hint.width() > width {
            break;
        }
        spans.push(Span::styled(hint.key, styles::key_hint_style()));
        spans.push(Span::styled(hint.label, styles::dim_style()));
        used += hint.width();
    }
    Line::from(spans)
}

/// Render the bottom bar: the transient status message if any, otherwise
/// the key hints for the current input mode
pub fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel_bg = Style::default().bg(styles::PANEL);

    if let Some(msg) = &app.status_message {
        let style = if msg.starts_with("Error") {
            Style::default().fg(styles::RED)
        } else {
            Style::default().fg(styles::GREEN)
        };
        let bar = Paragraph::new(Line::from(Span::styled(format!(" {}", msg), style)))
            .style(panel_bg);
        f.render_widget(bar, area);
        return;
    }

    let hints = match app.input_mode {
        InputMode::Normal => NORMAL_HINTS,
        InputMode::Search => SEARCH_HINTS,
        InputMode::Feedback => FEEDBACK_HINTS,
    };
    let mut line = hint_line(hints, area.width as usize);

    // Right side: backend, matcher and watch state
    let mut info = format!("{} · {}", app.vcs_name(), app.matcher_name());
    if app.watching {
        info.push_str(" · watching");
    }
    if app.is_loading() {
        info.push_str(" · loading");
    }
    let used: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
    let info_width = info.chars().count() + 1;
    if used + info_width < area.width as usize {
        let pad = area.width as usize - used - info_width;
        line.spans.push(Span::raw(" ".repeat(pad)));
        line.spans
            .push(Span::styled(info, Style::default().fg(styles::MUTED)));
    }

    f.render_widget(Paragraph::new(line).style(panel_bg), area);
}

/// The search bar: `/query█` on the left, `[match status] status` on the right
pub fn render_search_bar(f: &mut Frame, area: Rect, app: &App) {
    let bar_style = Style::default().bg(styles::PANEL);
    let query = Line::from(vec![
        Span::styled(" /", styles::key_hint_style()),
        Span::styled(app.search.query(), Style::default().fg(styles::TEXT)),
        Span::styled("█", Style::default().fg(styles::BLUE)),
    ]);
    f.render_widget(Paragraph::new(query).style(bar_style), area);

    let right = search_summary(app);
    if right.is_empty() {
        return;
    }
    let summary_style = if app.search.matcher_error().is_some() || app.search.has_no_matches() {
        Style::default().fg(styles::RED)
    } else {
        Style::default().fg(styles::MUTED)
    };
    let summary = Paragraph::new(Line::from(Span::styled(right, summary_style)))
        .alignment(Alignment::Right);
    f.render_widget(summary, area);
}

fn search_summary(app: &App) -> String {
    if app.search.query().is_empty() {
        return String::new();
    }
    let status = app.search.status();
    if status.is_empty() {
        format!("[{}] ", app.diff.match_status())
    } else {
        format!("[{}] {} ", app.diff.match_status(), status)
    }
}

/// Small toast in the top-right corner
pub fn render_notification(f: &mut Frame, area: Rect, message: &str) {
    let width = message.chars().count() as u16 + 4;
    let notif_area = Rect {
        x: area.x + area.width.saturating_sub(width + 2),
        y: area.y + 1,
        width: width.min(area.width),
        height: 1,
    };

    let notif = Paragraph::new(Line::from(vec![
        Span::styled(" ● ", Style::default().fg(styles::GREEN)),
        Span::styled(
            message,
            Style::default().fg(styles::TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ]))
    .style(Style::default().bg(styles::PANEL).fg(styles::TEXT));

    f.render_widget(notif, notif_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn hints_fit_within_width() {
        let line = hint_line(FEEDBACK_HINTS, 80);
        assert_eq!(text(&line), " Enter save  ^J newline  Esc cancel");
    }

    #[test]
    fn hints_that_overflow_are_dropped() {
        let line = hint_line(FEEDBACK_HINTS, 20);
        assert_eq!(text(&line), " Enter save  ");
    }

    #[test]
    fn zero_width_yields_padding_only() {
        assert_eq!(text(&hint_line(NORMAL_HINTS, 0)), " ");
    }
}
