//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Picker layout: query line on top, candidate list, status bar at the bottom.
pub struct AppLayout {
    pub query_area: Rect,
    pub list_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // query input
                Constraint::Min(3),    // candidate list (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            query_area: chunks[0],
            list_area: chunks[1],
            status_area: chunks[2],
        }
    }
}
