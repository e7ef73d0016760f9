//! Plain-text shells: one-shot report and a status-line feed.

pub mod once;
pub mod watch;
