use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

use usagebar_core::usage::FetchSnapshot;

use crate::menu::MenuModel;

/// Shared state type alias
pub type SharedState = Arc<RwLock<ShellState>>;

/// Spinner frames for the fetching indicator
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// State of the terminal shell
#[derive(Debug)]
pub struct ShellState {
    /// Latest snapshot delivered by the fetcher
    pub snapshot: FetchSnapshot,
    /// Menu built from `snapshot`
    pub menu: MenuModel,
    /// Whether help popup is shown
    pub show_help: bool,
    /// Whether the app is running
    pub running: bool,
    /// When the next scheduled refresh fires
    pub next_refresh: Option<Instant>,
    /// Spinner animation frame counter
    pub spinner_frame: usize,
    /// Last spinner update time
    last_spinner_update: Instant,
}

impl ShellState {
    /// Create a new shell state
    pub fn new() -> Self {
        let snapshot = FetchSnapshot::default();
        Self {
            menu: MenuModel::build(&snapshot),
            snapshot,
            show_help: false,
            running: true,
            next_refresh: None,
            spinner_frame: 0,
            last_spinner_update: Instant::now(),
        }
    }

    /// Create a shared state
    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Replace the displayed snapshot and rebuild the menu
    pub fn apply(&mut self, snapshot: &FetchSnapshot) {
        self.menu = MenuModel::build(snapshot);
        self.snapshot = snapshot.clone();
    }

    /// Advance the spinner animation frame (time-based, ~150ms per frame)
    pub fn tick_spinner(&mut self) {
        if self.last_spinner_update.elapsed().as_millis() >= 150 {
            self.last_spinner_update = Instant::now();
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Get the current spinner character
    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    /// Time left until the next scheduled refresh
    pub fn until_refresh(&self) -> Option<Duration> {
        self.next_refresh
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Toggle help popup
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usagebar_core::usage::parse_usage_output;

    #[test]
    fn test_new_state() {
        let state = ShellState::new();
        assert!(state.running);
        assert!(!state.show_help);
        assert_eq!(state.menu.title, "😴 --");
        assert!(state.until_refresh().is_none());
    }

    #[test]
    fn test_apply_rebuilds_menu() {
        let mut state = ShellState::new();
        let snapshot = FetchSnapshot {
            data: Some(parse_usage_output("SESSION_REMAINING=7\nWEEKLY_REMAINING=9\n")),
            fetch_count: 1,
            ..Default::default()
        };
        state.apply(&snapshot);
        assert_eq!(state.menu.title, "🤖 W:9% S:7%");
        assert_eq!(state.snapshot, snapshot);
    }

    #[test]
    fn test_quit_and_help() {
        let mut state = ShellState::new();
        state.toggle_help();
        assert!(state.show_help);
        state.toggle_help();
        assert!(!state.show_help);
        state.quit();
        assert!(!state.running);
    }

    #[test]
    fn test_until_refresh_saturates() {
        let mut state = ShellState::new();
        state.next_refresh = Some(Instant::now());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(state.until_refresh(), Some(Duration::ZERO));
    }
}
