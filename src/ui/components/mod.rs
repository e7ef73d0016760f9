mod help_popup;
mod status_bar;
mod title_bar;
mod usage_panel;

pub use help_popup::HelpPopup;
pub use status_bar::StatusBar;
pub use title_bar::TitleBar;
pub use usage_panel::UsagePanel;

use ratatui::style::{Color, Style};

/// Foreground style, or the terminal default when color is disabled
pub(crate) fn fg(color: bool, c: Color) -> Style {
    if color {
        Style::default().fg(c)
    } else {
        Style::default()
    }
}
