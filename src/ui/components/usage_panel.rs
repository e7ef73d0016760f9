//! Usage menu panel: account, session, weekly, and fetch status sections.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use usagebar_core::usage::project;

use super::fg;
use crate::state::ShellState;

/// Width of the remaining-quota bars
const BAR_WIDTH: usize = 20;

/// Usage menu widget
pub struct UsagePanel;

impl UsagePanel {
    /// Render the menu sections
    pub fn render(frame: &mut Frame, area: Rect, state: &ShellState, color: bool) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(fg(color, Color::Gray));

        let menu = &state.menu;
        let values = project(state.snapshot.data.as_ref());
        let has_data = state.snapshot.has_data();
        let dim = fg(color, Color::DarkGray).add_modifier(Modifier::DIM);
        let text = fg(color, Color::White);

        let mut lines = vec![
            Line::from(Span::styled(format!(" {}", menu.account), fg(color, Color::Cyan))),
            Line::from(""),
            Line::from(Span::styled(format!(" {}", menu.session), text)),
        ];
        if has_data {
            lines.push(Self::meter_line(&values.session_remaining, color));
        }
        let depletes_style = if menu.exhausts_before_reset {
            fg(color, Color::Yellow)
        } else {
            text
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", menu.depletes),
            depletes_style,
        )));
        lines.push(Line::from(Span::styled(format!(" {}", menu.session_resets), dim)));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(format!(" {}", menu.weekly), text)));
        if has_data {
            lines.push(Self::meter_line(&values.weekly_remaining, color));
        }
        lines.push(Line::from(Span::styled(format!(" {}", menu.weekly_resets), dim)));
        lines.push(Line::from(""));

        let updated_style = if menu.is_stale {
            fg(color, Color::Yellow)
        } else {
            dim
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", menu.last_updated),
            updated_style,
        )));
        lines.push(Line::from(Span::styled(format!(" {}", menu.status), dim)));
        let error_style = if state.snapshot.error.is_some() {
            fg(color, Color::Red)
        } else {
            dim
        };
        lines.push(Line::from(Span::styled(format!(" {}", menu.error), error_style)));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    /// Bar of remaining quota: " ██████████░░░░░░░░░░"
    fn meter_line(percent: &str, color: bool) -> Line<'static> {
        let Some(pct) = Self::parse_percent(percent) else {
            return Line::from("");
        };

        let filled = BAR_WIDTH * pct as usize / 100;
        let empty = BAR_WIDTH.saturating_sub(filled);
        let bar_color = match pct {
            0..=10 => Color::Red,
            11..=30 => Color::Yellow,
            _ => Color::Green,
        };

        Line::from(vec![
            Span::raw(" "),
            Span::styled("█".repeat(filled), fg(color, bar_color)),
            Span::styled(
                "░".repeat(empty),
                fg(color, Color::DarkGray).add_modifier(Modifier::DIM),
            ),
        ])
    }

    /// Parse "42" or "42.5" into a clamped whole percentage
    fn parse_percent(value: &str) -> Option<u8> {
        let value: f64 = value.trim().trim_end_matches('%').parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(value.clamp(0.0, 100.0).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percent() {
        assert_eq!(UsagePanel::parse_percent("42"), Some(42));
        assert_eq!(UsagePanel::parse_percent("42.6"), Some(43));
        assert_eq!(UsagePanel::parse_percent("80%"), Some(80));
        assert_eq!(UsagePanel::parse_percent("150"), Some(100));
        assert_eq!(UsagePanel::parse_percent("-3"), Some(0));
        assert_eq!(UsagePanel::parse_percent("??"), None);
        assert_eq!(UsagePanel::parse_percent("--"), None);
    }

    #[test]
    fn test_meter_line_width() {
        let line = UsagePanel::meter_line("50", false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text.chars().count(), 1 + BAR_WIDTH);
        assert_eq!(text.chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_meter_line_unknown_is_blank() {
        let line = UsagePanel::meter_line("??", true);
        assert_eq!(line.width(), 0);
    }
}
