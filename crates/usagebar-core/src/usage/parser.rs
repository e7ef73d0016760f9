//! Parse the usage script's `KEY=value` output.

use super::types::{keys, ParsedFields, UNKNOWN_SENTINEL};

/// Result of checking parsed fields for the mandatory readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Both mandatory fields present with real values
    Valid,
    /// A mandatory field is missing or `??`
    Invalid { parsed_keys: usize },
}

impl Validity {
    pub fn is_valid(self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Parse script output into fields.
///
/// Expected format:
/// ```text
/// # comment lines and blank lines are ignored
/// SESSION_REMAINING=42
/// WEEKLY_REMAINING=88
/// TIME_REMAINING_STR=2h 10m
/// ```
///
/// Each line is split on its first `=` so values may contain `=`. Lines
/// without `=` are skipped. A key repeated on a later line overwrites the
/// earlier value.
pub fn parse_usage_output(text: &str) -> ParsedFields {
    let mut fields = ParsedFields::new();

    for line in text.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    fields
}

/// Check that both mandatory fields carry a known value
pub fn validate(fields: &ParsedFields) -> Validity {
    let all_known = keys::MANDATORY.iter().all(|key| {
        fields
            .get(*key)
            .is_some_and(|value| value != UNKNOWN_SENTINEL)
    });

    if all_known {
        Validity::Valid
    } else {
        Validity::Invalid {
            parsed_keys: fields.len(),
        }
    }
}
