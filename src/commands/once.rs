//! `usagebar once`: fetch a single reading and print it.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use usagebar_core::usage::{project, DisplayValues, FetchSnapshot, ScriptRunner, UsageFetcher};

use crate::menu::MenuModel;

/// JSON document printed by `once --json`
#[derive(Debug, Serialize)]
struct Report<'a> {
    state: &'a FetchSnapshot,
    display: DisplayValues,
    title: String,
}

/// Fetch once and print the menu (or JSON) to stdout
pub async fn run<R: ScriptRunner>(fetcher: &UsageFetcher<R>, json: bool) -> Result<()> {
    fetcher.fetch_once().await;
    let snapshot = fetcher.snapshot();

    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), &snapshot, json)?;

    if !snapshot.has_data() {
        anyhow::bail!(
            "No usage data: {}",
            snapshot.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn write_report(out: &mut impl Write, snapshot: &FetchSnapshot, json: bool) -> Result<()> {
    let menu = MenuModel::build(snapshot);

    if json {
        let report = Report {
            state: snapshot,
            display: project(snapshot.data.as_ref()),
            title: menu.title,
        };
        serde_json::to_writer_pretty(&mut *out, &report).context("Failed to encode report")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", menu.to_text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use usagebar_core::usage::parse_usage_output;

    fn snapshot() -> FetchSnapshot {
        FetchSnapshot {
            data: Some(parse_usage_output("SESSION_REMAINING=42\nWEEKLY_REMAINING=88\n")),
            status: "OK (fetch #1) @ 10:00:00".to_string(),
            fetch_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_text_report() {
        let mut out = Vec::new();
        write_report(&mut out, &snapshot(), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("🤖 W:88% S:42%\n"));
        assert!(text.contains("Session remaining: 42%"));
        assert!(text.contains("Status: OK (fetch #1) @ 10:00:00"));
    }

    #[test]
    fn test_json_report() {
        let mut out = Vec::new();
        write_report(&mut out, &snapshot(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["display"]["session_remaining"], "42");
        assert_eq!(value["display"]["exhausts_before_reset"], false);
        assert_eq!(value["state"]["fetch_count"], 1);
        assert_eq!(value["title"], "🤖 W:88% S:42%");
    }
}
