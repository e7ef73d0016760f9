//! Usage data types produced by the usage script and the fetcher.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Fields parsed from the usage script's `KEY=value` output
pub type ParsedFields = BTreeMap<String, String>;

/// Sentinel the usage script prints for "value unknown"
pub const UNKNOWN_SENTINEL: &str = "??";

/// Field keys understood by the display projection
pub mod keys {
    pub const SESSION_REMAINING: &str = "SESSION_REMAINING";
    pub const WEEKLY_REMAINING: &str = "WEEKLY_REMAINING";
    pub const TIME_REMAINING_STR: &str = "TIME_REMAINING_STR";
    pub const CONFIDENCE: &str = "CONFIDENCE";
    pub const SESSION_RESETS: &str = "SESSION_RESETS";
    pub const WEEKLY_RESETS: &str = "WEEKLY_RESETS";
    pub const EXHAUSTS_BEFORE_RESET: &str = "EXHAUSTS_BEFORE_RESET";
    pub const ACCOUNT_EMAIL: &str = "ACCOUNT_EMAIL";
    pub const PLAN_TYPE: &str = "PLAN_TYPE";
    pub const EXTRA_USED: &str = "EXTRA_USED";

    /// Keys that must be present (and not `??`) for a reading to be valid
    pub const MANDATORY: [&str; 2] = [SESSION_REMAINING, WEEKLY_REMAINING];
}

/// Mutable fetch state owned by the fetcher
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    /// Most recent validated field set (never cleared by a failed fetch)
    pub last_good_data: Option<ParsedFields>,
    /// When `last_good_data` was obtained
    pub last_successful_fetch: Option<DateTime<Local>>,
    /// Error from the most recent failed attempt
    pub last_error: Option<String>,
    /// Number of fetch attempts started
    pub fetch_count: u64,
    /// Attempts currently in flight
    pub in_flight: usize,
    /// Whether the most recent completed attempt failed to produce valid data
    pub is_stale: bool,
    /// Status label from the most recent notification
    pub status: String,
}

impl FetchState {
    /// Whether any fetch attempt is currently running
    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    /// Clone the state into a notification payload
    pub fn snapshot(&self) -> FetchSnapshot {
        FetchSnapshot {
            data: self.last_good_data.clone(),
            is_stale: self.is_stale,
            error: self.last_error.clone(),
            status: self.status.clone(),
            fetch_count: self.fetch_count,
            last_successful_fetch: self.last_successful_fetch,
            is_fetching: self.is_fetching(),
        }
    }
}

/// Consistent view of the fetch state delivered to listeners
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchSnapshot {
    /// Last known-good fields, if any fetch ever succeeded
    pub data: Option<ParsedFields>,
    /// Whether `data` is not confirmed current
    pub is_stale: bool,
    /// Most recent error message
    pub error: Option<String>,
    /// Human-readable status of the latest attempt
    pub status: String,
    /// Number of fetch attempts started
    pub fetch_count: u64,
    /// When `data` was obtained
    pub last_successful_fetch: Option<DateTime<Local>>,
    /// Whether a fetch is currently running
    pub is_fetching: bool,
}

impl FetchSnapshot {
    /// Whether usable data has ever been received
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.is_empty())
    }
}

/// Display-ready values projected from parsed fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayValues {
    pub session_remaining: String,
    pub weekly_remaining: String,
    pub time_remaining_str: Option<String>,
    /// Estimate confidence as a 0-1 decimal string
    pub confidence: Option<String>,
    pub session_resets: Option<String>,
    pub weekly_resets: Option<String>,
    /// Session is projected to run out before it resets
    pub exhausts_before_reset: bool,
    pub account_email: Option<String>,
    pub plan_type: Option<String>,
    /// Extra usage consumed, in percent
    pub extra_pct: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_snapshot() {
        let state = FetchState::default();
        let snapshot = state.snapshot();
        assert!(!snapshot.has_data());
        assert!(!snapshot.is_fetching);
        assert!(!snapshot.is_stale);
        assert_eq!(snapshot.fetch_count, 0);
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_is_fetching_tracks_in_flight() {
        let mut state = FetchState::default();
        state.in_flight = 2;
        assert!(state.snapshot().is_fetching);
        state.in_flight = 0;
        assert!(!state.snapshot().is_fetching);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut data = ParsedFields::new();
        data.insert(keys::SESSION_REMAINING.to_string(), "42".to_string());
        let snapshot = FetchSnapshot {
            data: Some(data),
            status: "OK".to_string(),
            fetch_count: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["data"]["SESSION_REMAINING"], "42");
        assert_eq!(json["fetch_count"], 3);
        assert_eq!(json["is_stale"], false);
    }
}
