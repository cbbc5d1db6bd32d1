//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout with tree pane and a bottom status bar.
pub struct AppLayout {
    pub tree_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),    // tree pane: borders + header + one row
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            tree_area: chunks[0],
            status_area: chunks[1],
        }
    }

    /// Flat row offset (relative to the scroll position) under terminal
    /// row `y`, or `None` outside the row list.
    pub fn row_at(&self, y: u16) -> Option<usize> {
        // Border, then the column header.
        let first = self.tree_area.y.saturating_add(2);
        let end = self
            .tree_area
            .y
            .saturating_add(self.tree_area.height.saturating_sub(1));
        (y >= first && y < end).then(|| (y - first) as usize)
    }
}

pub fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
