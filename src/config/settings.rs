use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use usagebar_core::usage::ProcessRunner;

/// File name of the usage script looked up next to the executable
const DEFAULT_SCRIPT_NAME: &str = "fetch_usage.sh";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Claude usage status bar")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Usage script to run
    #[arg(short, long, global = true)]
    pub script: Option<PathBuf>,

    /// Interpreter for the usage script ("" runs it directly)
    #[arg(long, global = true)]
    pub shell: Option<String>,

    /// Refresh interval in seconds
    #[arg(short = 'i', long, global = true)]
    pub interval: Option<u64>,

    /// Script timeout in seconds
    #[arg(short = 't', long, global = true)]
    pub timeout: Option<u64>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive status panel (default)
    Tui,
    /// Fetch once and print the menu
    Once {
        /// Print the snapshot and display values as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the title line on every update (for tmux/i3blocks status lines)
    Watch,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Subcommand to run, defaulting to the interactive panel
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Usage script path (defaults to `fetch_usage.sh` next to the executable)
    #[serde(default)]
    pub script_path: Option<PathBuf>,

    /// Interpreter used to launch the script; empty runs the script directly
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Seconds between scheduled fetches
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Seconds before a running script is killed
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_fetch_timeout() -> u64 {
    90
}

/// UI-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Enable color output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Show the key hint bar at the bottom of the panel
    #[serde(default = "default_show_status_bar")]
    pub show_status_bar: bool,
}

fn default_color() -> bool {
    true
}

fn default_show_status_bar() -> bool {
    true
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            color: default_color(),
            show_status_bar: default_show_status_bar(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            script_path: None,
            shell: default_shell(),
            refresh_interval_secs: default_refresh_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            ui: UiSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::read(p);
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("usagebar/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/usagebar/config.toml")),
            dirs::home_dir().map(|p| p.join(".usagebar.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::read(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(script) = &cli.script {
            self.script_path = Some(script.clone());
        }
        if let Some(shell) = &cli.shell {
            self.shell = shell.clone();
        }
        if let Some(interval) = cli.interval {
            self.refresh_interval_secs = interval;
        }
        if let Some(timeout) = cli.timeout {
            self.fetch_timeout_secs = timeout;
        }
    }

    /// Validate and normalize settings values
    ///
    /// A zero interval would spawn the script in a tight loop.
    pub fn validate(&mut self) {
        const MIN_SECS: u64 = 1;

        if self.refresh_interval_secs < MIN_SECS {
            self.refresh_interval_secs = MIN_SECS;
        }
        if self.fetch_timeout_secs < MIN_SECS {
            self.fetch_timeout_secs = MIN_SECS;
        }
    }

    /// Refresh interval as a duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Resolve the usage script path
    pub fn script(&self) -> Result<PathBuf> {
        if let Some(path) = &self.script_path {
            return Ok(path.clone());
        }

        let exe = std::env::current_exe().context("Failed to locate the usagebar executable")?;
        let dir = exe
            .parent()
            .context("usagebar executable has no parent directory")?;
        Ok(dir.join(DEFAULT_SCRIPT_NAME))
    }

    /// Build the script runner described by these settings
    pub fn runner(&self) -> Result<ProcessRunner> {
        let interpreter = Some(self.shell.clone()).filter(|s| !s.trim().is_empty());
        Ok(ProcessRunner::new(self.script()?)
            .with_interpreter(interpreter)
            .with_timeout(Duration::from_secs(self.fetch_timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.refresh_interval_secs, 300);
        assert_eq!(settings.fetch_timeout_secs, 90);
        assert_eq!(settings.shell, "bash");
        assert!(settings.script_path.is_none());
        assert!(settings.ui.color);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            script_path = "/opt/usage/fetch_usage.sh"
            shell = ""
            refresh_interval_secs = 60

            [ui]
            show_status_bar = false
        "#;

        let settings: Settings = toml::from_str(toml).expect("Should parse TOML");
        assert_eq!(
            settings.script_path,
            Some(PathBuf::from("/opt/usage/fetch_usage.sh"))
        );
        assert_eq!(settings.shell, "");
        assert_eq!(settings.refresh_interval_secs, 60);
        assert_eq!(settings.fetch_timeout_secs, 90);
        assert!(!settings.ui.show_status_bar);
    }

    #[test]
    fn test_merge_cli_overrides_file() {
        let cli = Config::try_parse_from([
            "usagebar",
            "--script",
            "/tmp/usage.sh",
            "--interval",
            "30",
            "-t",
            "5",
            "once",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.command(), Command::Once { json: true });

        let mut settings = Settings::default();
        settings.merge_cli(&cli);
        assert_eq!(settings.script_path, Some(PathBuf::from("/tmp/usage.sh")));
        assert_eq!(settings.refresh_interval_secs, 30);
        assert_eq!(settings.fetch_timeout_secs, 5);
        assert_eq!(settings.shell, "bash");
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Config::try_parse_from(["usagebar"]).unwrap();
        assert_eq!(cli.command(), Command::Tui);
    }

    #[test]
    fn test_validate_clamps_zero() {
        let mut settings = Settings {
            refresh_interval_secs: 0,
            fetch_timeout_secs: 0,
            ..Settings::default()
        };
        settings.validate();
        assert_eq!(settings.refresh_interval(), Duration::from_secs(1));
        assert_eq!(settings.fetch_timeout_secs, 1);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fetch_timeout_secs = 15").unwrap();

        let settings = Settings::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.fetch_timeout_secs, 15);
        assert_eq!(settings.refresh_interval_secs, 300);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval_secs = \"soon\"").unwrap();

        let err = Settings::load(Some(&file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_runner_from_settings() {
        let settings = Settings {
            script_path: Some(PathBuf::from("/opt/usage/fetch_usage.sh")),
            fetch_timeout_secs: 12,
            ..Settings::default()
        };
        let runner = settings.runner().unwrap();
        assert_eq!(runner.script(), PathBuf::from("/opt/usage/fetch_usage.sh"));
        assert_eq!(runner.timeout(), Duration::from_secs(12));
    }
}
