//! Tray menu model built from a fetch snapshot.
//!
//! Every shell (terminal panel, `once`, `watch`) renders this same model, so
//! the text shown for a given snapshot does not depend on the surface.

use usagebar_core::usage::{project, DisplayValues, FetchSnapshot};

const ROBOT: &str = "🤖";
const SLEEPING: &str = "😴";
const REFRESHING: &str = "⟳";
const WARNING: &str = "⚠️";

/// Text of the status item and its menu entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuModel {
    /// Status-bar title (glyph plus headline numbers)
    pub title: String,
    pub account: String,
    pub session: String,
    pub depletes: String,
    pub session_resets: String,
    pub weekly: String,
    pub weekly_resets: String,
    pub last_updated: String,
    pub status: String,
    pub error: String,
    /// Displayed data is not confirmed current
    pub is_stale: bool,
    /// Session is projected to run out before it resets
    pub exhausts_before_reset: bool,
    /// A fetch is running
    pub is_fetching: bool,
}

impl MenuModel {
    /// Build the menu for a snapshot
    pub fn build(snapshot: &FetchSnapshot) -> Self {
        let values = project(snapshot.data.as_ref());
        let has_data = snapshot.has_data();

        let status = if snapshot.status.is_empty() {
            "Status: Starting...".to_string()
        } else {
            format!("Status: {}", snapshot.status)
        };
        let error = match &snapshot.error {
            Some(err) => format!("Last error: {}", err),
            None => "Last error: None".to_string(),
        };
        let last_updated = match snapshot.last_successful_fetch {
            Some(at) => {
                let suffix = if snapshot.is_stale { " (stale)" } else { "" };
                format!("Last updated: {}{}", at.format("%H:%M:%S"), suffix)
            }
            None => "Last updated: Never".to_string(),
        };

        let mut model = Self {
            title: String::new(),
            account: "Account: --".to_string(),
            session: String::new(),
            depletes: "Depletes: --".to_string(),
            session_resets: "Resets: --".to_string(),
            weekly: String::new(),
            weekly_resets: "Resets: --".to_string(),
            last_updated,
            status,
            error,
            is_stale: snapshot.is_stale,
            exhausts_before_reset: false,
            is_fetching: snapshot.is_fetching,
        };

        if has_data {
            model.fill_from_values(&values, snapshot.is_stale);
        } else if snapshot.is_fetching {
            model.title = format!("{} {}", ROBOT, REFRESHING);
            model.session = "Session: Loading...".to_string();
            model.weekly = "Weekly: Loading...".to_string();
        } else {
            model.title = format!("{} {}", SLEEPING, values.session_remaining);
            model.session = "Session: Waiting for data...".to_string();
            model.weekly = "Weekly: Waiting for data...".to_string();
        }

        model
    }

    fn fill_from_values(&mut self, v: &DisplayValues, is_stale: bool) {
        let robot = if is_stale { SLEEPING } else { ROBOT };
        let warning = if v.exhausts_before_reset {
            format!("{} ", WARNING)
        } else {
            String::new()
        };
        self.exhausts_before_reset = v.exhausts_before_reset;

        self.title = match &v.time_remaining_str {
            Some(time) => format!("{}{} {} ({}%)", warning, robot, time, v.session_remaining),
            None => format!(
                "{} W:{}% S:{}%",
                robot, v.weekly_remaining, v.session_remaining
            ),
        };

        if let Some(email) = &v.account_email {
            self.account = match &v.plan_type {
                Some(plan) => format!("Account: {} ({})", email, plan),
                None => format!("Account: {}", email),
            };
        }

        self.session = format!("Session remaining: {}%", v.session_remaining);

        if let Some(time) = &v.time_remaining_str {
            let mut text = format!("Depletes in ~{}", time);
            if let Some(conf) = v.confidence_percent() {
                text.push_str(&format!(" ({}% conf)", conf));
            }
            if v.exhausts_before_reset {
                text.push_str(&format!(" {} before reset!", WARNING));
            }
            self.depletes = text;
        }

        if let Some(resets) = &v.session_resets {
            self.session_resets = format!("Resets at {}", resets);
        }

        self.weekly = match &v.extra_pct {
            Some(extra) => format!(
                "Weekly remaining: {}% (Extra: {}% used)",
                v.weekly_remaining, extra
            ),
            None => format!("Weekly remaining: {}%", v.weekly_remaining),
        };

        if let Some(resets) = &v.weekly_resets {
            self.weekly_resets = format!("Resets {}", resets);
        }
    }

    /// Menu entries grouped between separators
    pub fn sections(&self) -> Vec<Vec<&str>> {
        vec![
            vec![self.account.as_str()],
            vec![
                self.session.as_str(),
                self.depletes.as_str(),
                self.session_resets.as_str(),
            ],
            vec![self.weekly.as_str(), self.weekly_resets.as_str()],
            vec![
                self.last_updated.as_str(),
                self.status.as_str(),
                self.error.as_str(),
            ],
        ]
    }

    /// Plain-text rendering: title, then sections separated by blank lines
    pub fn to_text(&self) -> String {
        let mut out = self.title.clone();
        for section in self.sections() {
            out.push('\n');
            for line in section {
                out.push('\n');
                out.push_str(line);
            }
        }
        out
    }
}
