use ratatui::layout::{Constraint, Direction, Rect};

/// Height of the title bar (1 row of text plus borders)
const TITLE_HEIGHT: u16 = 3;

/// Layout configuration for the UI
pub struct Layout {
    /// Whether the key hint bar is shown
    pub show_status_bar: bool,
}

/// Calculated areas for one frame
#[derive(Debug, Clone, Copy)]
pub struct LayoutAreas {
    /// Area for the status-bar title
    pub title: Rect,
    /// Area for the usage menu
    pub menu: Rect,
    /// Area for the key hint bar (if shown)
    pub status_bar: Option<Rect>,
}

impl Layout {
    /// Create a new layout with default settings
    pub fn new() -> Self {
        Self {
            show_status_bar: true,
        }
    }

    /// Show or hide the key hint bar
    pub fn with_status_bar(mut self, show: bool) -> Self {
        self.show_status_bar = show;
        self
    }

    /// Calculate the main areas
    /// Layout: [ Title ]
    ///         [ Menu  ]
    ///         [ Status bar ]
    pub fn calculate(&self, area: Rect) -> LayoutAreas {
        let status_height = if self.show_status_bar { 1 } else { 0 };

        let rows = ratatui::layout::Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TITLE_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(status_height),
            ])
            .split(area);

        LayoutAreas {
            title: rows[0],
            menu: rows[1],
            status_bar: self.show_status_bar.then_some(rows[2]),
        }
    }

    /// Calculate a centered popup area
    pub fn popup_area(&self, area: Rect, width_pct: u16, height_pct: u16) -> Rect {
        let popup_layout = ratatui::layout::Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - height_pct) / 2),
                Constraint::Percentage(height_pct),
                Constraint::Percentage((100 - height_pct) / 2),
            ])
            .split(area);

        ratatui::layout::Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - width_pct) / 2),
                Constraint::Percentage(width_pct),
                Constraint::Percentage((100 - width_pct) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}
