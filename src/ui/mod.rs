mod diff_view;
mod feedback;
mod file_list;
mod status_bar;
mod styles;

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

/// Split the screen into (file list, diff panel, bottom bar)
fn layout(area: Rect, sidebar_width: u16) -> (Rect, Rect, Rect) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // main content
            Constraint::Length(1), // bottom bar
        ])
        .split(area);

    // Sidebar never takes more than a third of the width
    let sidebar = sidebar_width.min(outer[0].width / 3).max(12);
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar), Constraint::Min(1)])
        .split(outer[0]);

    (main[0], main[1], outer[1])
}

/// Lines of diff visible with the current terminal size, used for paging
pub fn diff_viewport_height(area: Rect, app: &App) -> usize {
    let (_, diff_area, _) = layout(area, app.config.display.sidebar_width);
    diff_view::content_height(diff_area, app.search.is_active())
}

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App) {
    let (list_area, diff_area, bar_area) = layout(f.area(), app.config.display.sidebar_width);

    file_list::render(f, list_area, app);
    diff_view::render(f, diff_area, app);
    status_bar::render_bottom_bar(f, bar_area, app);

    if let Some(ref msg) = app.notification {
        status_bar::render_notification(f, f.area(), msg);
    }

    if let Some(ref draft) = app.feedback {
        feedback::render(f, f.area(), draft);
    }
}
