use anyhow::Result;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use usagebar::commands;
use usagebar::config::{Command, Config, Settings};
use usagebar::ui::App;
use usagebar_core::usage::UsageFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();
    let command = cli.command();

    // Setup logging
    setup_logging(cli.debug, command == Command::Tui);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    let fetcher = UsageFetcher::new(settings.runner()?);

    match command {
        Command::Tui => {
            let mut app = App::new(settings, fetcher);
            app.run().await
        }
        Command::Once { json } => commands::once::run(&fetcher, json).await,
        Command::Watch => commands::watch::run(&fetcher, settings.refresh_interval()).await,
    }
}

fn setup_logging(debug: bool, to_file: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("usagebar=debug,usagebar_core=debug")
        } else {
            EnvFilter::new("usagebar=info,usagebar_core=info")
        }
    });

    // The terminal panel owns the screen, so its logs go to a file
    let writer = if to_file {
        let path = std::env::temp_dir().join("usagebar.log");
        match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(_) => BoxMakeWriter::new(std::io::sink),
        }
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(!to_file)
                .with_writer(writer),
        )
        .init();
}
