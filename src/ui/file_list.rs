use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

use super::styles;
use crate::app::App;
use crate::vcs::FileStatus;

/// Render the changed-file list (left side)
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let files = &app.files;
    let visible = files.count();
    let total = files.total_count();

    let title = if files.is_filtered() {
        format!(" FILES ({}/{}) ", visible, total)
    } else {
        format!(" FILES ({}) ", total)
    };

    // Only the rows inside the viewport are built; the selection is kept
    // centred once the list is longer than the panel
    let viewport_height = area.height.saturating_sub(1) as usize;
    let selected_pos = files.display_cursor().unwrap_or(0);
    let first_row = list_offset(selected_pos, visible, viewport_height);
    let last_row = (first_row + viewport_height).min(visible);

    let path_width = (area.width as usize).saturating_sub(5).max(1);

    let items: Vec<ListItem> = (first_row..last_row)
        .filter_map(|row| files.visible_at(row))
        .map(|(idx, file)| {
            let is_selected = idx == files.cursor();
            let symbol_style = match file.status {
                FileStatus::Added => styles::status_added(),
                FileStatus::Deleted => styles::status_deleted(),
                FileStatus::Renamed => styles::status_renamed(),
                FileStatus::Modified => styles::status_modified(),
            };
            let line_style = if is_selected {
                styles::selected_style()
            } else {
                styles::surface_style()
            };

            let path = shorten_path(&file.path, path_width);
            let line = Line::from(vec![
                Span::styled(format!(" {} ", file.status.symbol()), symbol_style),
                Span::styled(format!("{:<width$}", path, width = path_width), line_style),
            ]);
            ListItem::new(line).style(line_style)
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(styles::MUTED)))
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(styles::BORDER))
        .style(Style::default().bg(styles::SURFACE))
        .padding(Padding::new(0, 0, 0, 0));

    if items.is_empty() {
        let empty = if app.is_loading() && total == 0 {
            "  Loading…"
        } else {
            "  No files changed"
        };
        let list = List::new(vec![ListItem::new(Line::from(Span::styled(
            empty,
            Style::default().fg(styles::MUTED),
        )))])
        .block(block);
        f.render_widget(list, area);
        return;
    }

    f.render_widget(List::new(items).block(block), area);
}

/// First visible row so that `selected` stays in view
fn list_offset(selected: usize, len: usize, height: usize) -> usize {
    if len <= height || selected < height / 2 {
        0
    } else if selected > len.saturating_sub(height / 2) {
        len.saturating_sub(height)
    } else {
        selected.saturating_sub(height / 2)
    }
}

/// Fit a path into `max_width` characters, keeping the file name intact
/// whenever it fits on its own
fn shorten_path(path: &str, max_width: usize) -> String {
    let len = path.chars().count();
    if len <= max_width {
        return path.to_string();
    }

    let (dir, name) = match path.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", path),
    };
    let name_len = name.chars().count();

    if name_len > max_width {
        let truncated: String = name.chars().take(max_width.saturating_sub(1)).collect();
        return format!("{}…", truncated);
    }

    let room = max_width.saturating_sub(name_len + 2);
    if room == 0 || dir.is_empty() {
        return name.to_string();
    }
    let dir_part: String = dir.chars().take(room).collect();
    format!("{}…/{}", dir_part, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── shorten_path ──

    #[test]
    fn short_path_returned_as_is() {
        assert_eq!(shorten_path("src/main.rs", 30), "src/main.rs");
        assert_eq!(shorten_path("src/main.rs", 11), "src/main.rs");
    }

    #[test]
    fn long_directory_is_truncated_before_name() {
        // room = 20 - (7 + 2) = 11
        assert_eq!(
            shorten_path("src/very/long/nested/path/main.rs", 20),
            "src/very/lo…/main.rs"
        );
    }

    #[test]
    fn name_alone_when_no_room_for_directory() {
        assert_eq!(shorten_path("a/b/c/main.rs", 8), "main.rs");
    }

    #[test]
    fn long_name_truncated_with_ellipsis() {
        assert_eq!(shorten_path("very_long_filename_here.rs", 10), "very_long…");
    }

    #[test]
    fn multibyte_paths_measured_in_chars() {
        assert_eq!(shorten_path("dir/ünïcödé.rs", 14), "dir/ünïcödé.rs");
    }

    // ── list_offset ──

    #[test]
    fn offset_zero_when_everything_fits() {
        assert_eq!(list_offset(8, 10, 20), 0);
    }

    #[test]
    fn offset_centres_selection() {
        assert_eq!(list_offset(50, 100, 10), 45);
    }

    #[test]
    fn offset_pins_to_bottom_near_end() {
        assert_eq!(list_offset(98, 100, 10), 90);
    }
}
