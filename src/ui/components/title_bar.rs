//! Status-bar title: glyph plus headline numbers.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::fg;
use crate::state::ShellState;

/// Title bar widget
pub struct TitleBar;

impl TitleBar {
    /// Render the title bar
    pub fn render(frame: &mut Frame, area: Rect, state: &ShellState, color: bool) {
        let menu = &state.menu;

        let block = Block::default()
            .title(" usagebar ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(fg(color, Color::Gray));

        let mut spans = vec![Span::styled(
            format!(" {}", menu.title),
            Self::title_style(state, color),
        )];

        if menu.is_fetching {
            spans.push(Span::styled(
                format!("  {}", state.spinner_char()),
                fg(color, Color::Cyan),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn title_style(state: &ShellState, color: bool) -> Style {
        let base = Style::default().add_modifier(Modifier::BOLD);
        if !color {
            return base;
        }
        if state.menu.exhausts_before_reset {
            base.fg(Color::Yellow)
        } else if state.menu.is_stale || !state.snapshot.has_data() {
            base.fg(Color::DarkGray)
        } else {
            base.fg(Color::White)
        }
    }
}
