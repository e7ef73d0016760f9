use ratatui::{
    layout::Rect,
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::fg;
use crate::state::ShellState;

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn render(frame: &mut Frame, area: Rect, state: &ShellState, color: bool) {
        let mut spans = vec![];

        for (key, label, key_color) in [
            (" r", ":Refresh ", Color::Green),
            ("?", ":Help ", Color::Cyan),
            ("q", ":Quit ", Color::Yellow),
        ] {
            spans.push(Span::styled(
                key,
                fg(color, key_color).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(label, fg(color, Color::DarkGray)));
        }

        spans.push(Span::styled(
            format!(" {} ", Self::schedule_text(state)),
            fg(color, Color::DarkGray),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// "fetch #3 · next in 4m 12s"
    fn schedule_text(state: &ShellState) -> String {
        let fetches = format!("fetch #{}", state.snapshot.fetch_count);
        match state.until_refresh() {
            Some(left) => {
                let secs = left.as_secs();
                format!("{} · next in {}m {:02}s", fetches, secs / 60, secs % 60)
            }
            None => fetches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_schedule_text() {
        let mut state = ShellState::new();
        assert_eq!(StatusBar::schedule_text(&state), "fetch #0");

        state.snapshot.fetch_count = 3;
        state.next_refresh = Some(Instant::now() + Duration::from_secs(252) + Duration::from_millis(500));
        assert_eq!(
            StatusBar::schedule_text(&state),
            "fetch #3 · next in 4m 12s"
        );
    }
}
