use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::styles;
use crate::app::FeedbackDraft;

/// Render the feedback modal over the whole screen
pub fn render(f: &mut Frame, area: Rect, draft: &FeedbackDraft) {
    let (width, height) = modal_size(area);
    let popup = centered_rect(width, height, area);

    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", draft.anchor()),
            Style::default().fg(styles::CYAN).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(vec![
            Span::styled(" Enter", styles::key_hint_style()),
            Span::styled(" save  ", styles::dim_style()),
            Span::styled("^J", styles::key_hint_style()),
            Span::styled(" newline  ", styles::dim_style()),
            Span::styled("Esc", styles::key_hint_style()),
            Span::styled(" cancel ", styles::dim_style()),
        ]))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::BORDER))
        .style(Style::default().bg(styles::PANEL));

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // diff line
            Constraint::Length(1), // separator
            Constraint::Min(1),    // comment
        ])
        .split(inner);

    let context = Paragraph::new(Line::from(Span::styled(
        draft.line_text.as_str(),
        Style::default().fg(styles::MUTED),
    )));
    f.render_widget(context, parts[0]);

    let separator = Paragraph::new(Line::from(Span::styled(
        "─".repeat(parts[1].width as usize),
        Style::default().fg(styles::BORDER),
    )));
    f.render_widget(separator, parts[1]);

    let mut lines: Vec<Line> = draft
        .comment
        .split('\n')
        .map(|l| Line::from(Span::styled(l, Style::default().fg(styles::TEXT))))
        .collect();
    if let Some(last) = lines.last_mut() {
        last.spans
            .push(Span::styled("█", Style::default().fg(styles::CYAN)));
    }

    // Keep the cursor row in view once the comment outgrows the box
    let overflow = (lines.len() as u16).saturating_sub(parts[2].height);
    let comment = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((overflow, 0));
    f.render_widget(comment, parts[2]);
}

/// Three quarters of the screen, at least 40x10, never larger than the screen
fn modal_size(area: Rect) -> (u16, u16) {
    let width = (area.width * 3 / 4).max(40).min(area.width);
    let height = (area.height * 3 / 4).max(10).min(area.height);
    (width, height)
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(r.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_is_three_quarters_of_large_screens() {
        assert_eq!(modal_size(Rect::new(0, 0, 200, 60)), (150, 45));
    }

    #[test]
    fn modal_has_minimum_size() {
        assert_eq!(modal_size(Rect::new(0, 0, 48, 12)), (40, 10));
    }

    #[test]
    fn modal_never_exceeds_screen() {
        assert_eq!(modal_size(Rect::new(0, 0, 30, 8)), (30, 8));
    }

    #[test]
    fn centered_rect_is_centred() {
        let r = centered_rect(40, 10, Rect::new(0, 0, 100, 30));
        assert_eq!(r, Rect::new(30, 10, 40, 10));
    }
}
