//! Key handling separated from execution so the mapping can be tested
//! without a terminal.

use crossterm::event::{KeyCode, KeyModifiers};

/// Action to execute for a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Start a fetch now ("Refresh Now")
    Refresh,
    /// Show or hide the help popup
    ToggleHelp,
    /// Close the help popup
    CloseHelp,
    /// Exit the app
    Quit,
}

/// Map a key press to an action
pub fn resolve_key(code: KeyCode, modifiers: KeyModifiers, show_help: bool) -> KeyAction {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    // Any key closes the help popup
    if show_help {
        return KeyAction::CloseHelp;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('r') | KeyCode::F(5) => KeyAction::Refresh,
        KeyCode::Char('?') => KeyAction::ToggleHelp,
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(resolve_key(KeyCode::Char('q'), none, false), KeyAction::Quit);
        assert_eq!(resolve_key(KeyCode::Esc, none, false), KeyAction::Quit);
        assert_eq!(resolve_key(KeyCode::Char('r'), none, false), KeyAction::Refresh);
        assert_eq!(resolve_key(KeyCode::F(5), none, false), KeyAction::Refresh);
        assert_eq!(resolve_key(KeyCode::Char('?'), none, false), KeyAction::ToggleHelp);
        assert_eq!(resolve_key(KeyCode::Char('x'), none, false), KeyAction::None);
    }

    #[test]
    fn test_help_swallows_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(resolve_key(KeyCode::Char('r'), none, true), KeyAction::CloseHelp);
        assert_eq!(resolve_key(KeyCode::Char('q'), none, true), KeyAction::CloseHelp);
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        assert_eq!(
            resolve_key(KeyCode::Char('c'), KeyModifiers::CONTROL, true),
            KeyAction::Quit
        );
    }
}
