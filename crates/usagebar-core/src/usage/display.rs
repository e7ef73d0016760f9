//! Project parsed fields into display-ready values.

use super::types::{keys, DisplayValues, ParsedFields, UNKNOWN_SENTINEL};

/// Placeholder shown for percentages before any data has arrived
pub const NO_DATA: &str = "--";

/// Project fields into display values. Never fails; absent input yields
/// placeholders so shells never branch on missing keys themselves.
pub fn project(data: Option<&ParsedFields>) -> DisplayValues {
    let Some(data) = data.filter(|d| !d.is_empty()) else {
        return DisplayValues {
            session_remaining: NO_DATA.to_string(),
            weekly_remaining: NO_DATA.to_string(),
            time_remaining_str: None,
            confidence: None,
            session_resets: None,
            weekly_resets: None,
            exhausts_before_reset: false,
            account_email: None,
            plan_type: None,
            extra_pct: None,
        };
    };

    let get = |key: &str| data.get(key).cloned();
    let or_unknown = |key: &str| get(key).unwrap_or_else(|| UNKNOWN_SENTINEL.to_string());

    DisplayValues {
        session_remaining: or_unknown(keys::SESSION_REMAINING),
        weekly_remaining: or_unknown(keys::WEEKLY_REMAINING),
        time_remaining_str: get(keys::TIME_REMAINING_STR),
        confidence: get(keys::CONFIDENCE),
        session_resets: get(keys::SESSION_RESETS),
        weekly_resets: get(keys::WEEKLY_RESETS),
        exhausts_before_reset: data
            .get(keys::EXHAUSTS_BEFORE_RESET)
            .is_some_and(|v| v == "true"),
        account_email: get(keys::ACCOUNT_EMAIL),
        plan_type: get(keys::PLAN_TYPE),
        extra_pct: get(keys::EXTRA_USED),
    }
}

impl DisplayValues {
    /// Confidence as a rounded percentage ("0.84" -> 84)
    pub fn confidence_percent(&self) -> Option<u32> {
        let value: f64 = self.confidence.as_deref()?.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        Some((value * 100.0).round() as u32)
    }
}
