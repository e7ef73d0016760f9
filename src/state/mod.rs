mod store;

pub use store::{SharedState, ShellState, SPINNER_FRAMES};
