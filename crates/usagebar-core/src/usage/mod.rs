//! Usage monitoring — run the usage script, parse its `KEY=value` output,
//! and keep the last good reading for display.
//!
//! The fetcher is the only writer of [`FetchState`]; shells register a
//! listener and receive a [`FetchSnapshot`] after every state change.

pub mod display;
pub mod fetcher;
pub mod parser;
pub mod runner;
pub mod types;

pub use display::project;
pub use fetcher::{
    ChannelDispatcher, Delivery, DeliveryReceiver, DirectDispatcher, Dispatcher, UpdateListener,
    UsageFetcher,
};
pub use parser::{parse_usage_output, validate, Validity};
pub use runner::{ProcessRunner, RunError, ScriptOutput, ScriptRunner, DEFAULT_TIMEOUT};
pub use types::{DisplayValues, FetchSnapshot, FetchState, ParsedFields};
