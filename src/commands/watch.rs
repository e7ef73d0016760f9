//! `usagebar watch`: print the title line whenever it changes.
//!
//! Meant for status lines that read one line per update (tmux
//! `status-right` via a fifo, i3blocks persistent mode).

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use usagebar_core::usage::{FetchSnapshot, ScriptRunner, UsageFetcher};

use crate::menu::MenuModel;

/// Poll on the interval and print titles until Ctrl+C
pub async fn run<R: ScriptRunner>(fetcher: &UsageFetcher<R>, interval: Duration) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchSnapshot>();
    fetcher.set_listener(move |snapshot| {
        let _ = tx.send(snapshot.clone());
    });

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printer = TitlePrinter::default();
    info!("Watching usage (refresh every {}s)", interval.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("Scheduled refresh");
                drop(fetcher.trigger_fetch());
            }
            Some(snapshot) = rx.recv() => {
                let stdout = std::io::stdout();
                printer.print(&mut stdout.lock(), &snapshot)?;
            }
            _ = &mut ctrl_c => {
                debug!("Interrupted, stopping watch");
                break;
            }
        }
    }

    Ok(())
}

/// Writes a title only when it differs from the previous one
#[derive(Debug, Default)]
struct TitlePrinter {
    last: Option<String>,
}

impl TitlePrinter {
    fn print(&mut self, out: &mut impl Write, snapshot: &FetchSnapshot) -> Result<()> {
        let title = MenuModel::build(snapshot).title;
        if self.last.as_deref() == Some(title.as_str()) {
            return Ok(());
        }
        writeln!(out, "{}", title)?;
        out.flush()?;
        self.last = Some(title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usagebar_core::usage::parse_usage_output;

    #[test]
    fn test_prints_only_changes() {
        let mut printer = TitlePrinter::default();
        let mut out = Vec::new();

        let waiting = FetchSnapshot::default();
        let fetched = FetchSnapshot {
            data: Some(parse_usage_output("SESSION_REMAINING=42\nWEEKLY_REMAINING=88\n")),
            ..Default::default()
        };

        printer.print(&mut out, &waiting).unwrap();
        printer.print(&mut out, &waiting).unwrap();
        printer.print(&mut out, &fetched).unwrap();
        printer.print(&mut out, &fetched).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "😴 --\n🤖 W:88% S:42%\n");
    }
}
