//! Run the external usage script with a bounded timeout.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

/// Default time allowed for one script run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Characters of stderr kept in an exit error
const STDERR_PREVIEW_CHARS: usize = 100;

/// Why a script run did not produce output
#[derive(Debug, Error)]
pub enum RunError {
    /// Script exited with a non-zero status
    #[error("Script exit {code}: {stderr}")]
    Exit { code: i32, stderr: String },
    /// Script ran past the timeout and was killed
    #[error("Timeout after {}s", .0.as_secs())]
    Timeout(Duration),
    /// Script could not be started
    #[error("{:?}: {}", .0.kind(), .0)]
    Spawn(#[source] io::Error),
    /// Waiting on the running script failed
    #[error("{:?}: {}", .0.kind(), .0)]
    Io(#[source] io::Error),
}

/// Captured output of a successful run
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Wall time the script took
    pub elapsed: Duration,
}

/// Something that can produce usage script output
pub trait ScriptRunner: Send + Sync + 'static {
    /// Run the script once
    fn run(&self) -> impl Future<Output = Result<ScriptOutput, RunError>> + Send;
}

/// Runs the usage script as a child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Script to execute
    script: PathBuf,
    /// Interpreter used to launch the script (e.g., "bash"); `None` executes it directly
    interpreter: Option<String>,
    /// Maximum run time before the child is killed
    timeout: Duration,
}

impl ProcessRunner {
    /// Create a runner for the given script
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            interpreter: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Launch the script through an interpreter
    pub fn with_interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter.filter(|i| !i.trim().is_empty());
        self
    }

    /// Override the run timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Script path
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Run timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the command: no arguments, working directory is the script's own directory
    fn command(&self) -> io::Result<tokio::process::Command> {
        let script = std::path::absolute(&self.script)?;

        let mut command = match &self.interpreter {
            Some(interpreter) => {
                let mut c = tokio::process::Command::new(interpreter);
                c.arg(&script);
                c
            }
            None => tokio::process::Command::new(&script),
        };

        if let Some(dir) = script.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        Ok(command)
    }
}

impl ScriptRunner for ProcessRunner {
    async fn run(&self) -> Result<ScriptOutput, RunError> {
        let start = Instant::now();
        let child = self.command().and_then(|mut c| c.spawn()).map_err(RunError::Spawn)?;

        debug!(
            "Usage script started: {} (pid {:?})",
            self.script.display(),
            child.id()
        );

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(RunError::Io(e)),
            Err(_) => return Err(RunError::Timeout(self.timeout)),
        };

        let elapsed = start.elapsed();

        if !output.status.success() {
            return Err(RunError::Exit {
                code: exit_code(output.status),
                stderr: stderr_preview(&output.stderr),
            });
        }

        debug!("Usage script finished in {:.1}s", elapsed.as_secs_f32());

        Ok(ScriptOutput {
            stdout: output.stdout,
            elapsed,
        })
    }
}

/// Exit code, or the negated signal number when the process was killed by a signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

/// First characters of stderr on a single line
fn stderr_preview(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let preview: String = text
        .chars()
        .take(STDERR_PREVIEW_CHARS)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let preview = preview.trim_end();

    if preview.is_empty() {
        "no stderr".to_string()
    } else {
        preview.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_preview() {
        assert_eq!(stderr_preview(b"disk full\n"), "disk full");
        assert_eq!(stderr_preview(b"line one\nline two"), "line one line two");
        assert_eq!(stderr_preview(b""), "no stderr");
        assert_eq!(stderr_preview(b"\n\n"), "no stderr");

        let long = "x".repeat(250);
        assert_eq!(stderr_preview(long.as_bytes()).chars().count(), 100);
    }

    #[test]
    fn test_error_messages() {
        let exit = RunError::Exit {
            code: 1,
            stderr: "disk full".to_string(),
        };
        assert_eq!(exit.to_string(), "Script exit 1: disk full");
        assert_eq!(
            RunError::Timeout(DEFAULT_TIMEOUT).to_string(),
            "Timeout after 90s"
        );

        let spawn = RunError::Spawn(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(spawn.to_string(), "NotFound: missing");
    }

    #[test]
    fn test_blank_interpreter_is_ignored() {
        let runner = ProcessRunner::new("fetch_usage.sh").with_interpreter(Some("  ".into()));
        assert!(runner.interpreter.is_none());
        assert_eq!(runner.timeout(), DEFAULT_TIMEOUT);
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use std::io::Write;

        fn write_script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("fetch_usage.sh");
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "{}", body).unwrap();
            path
        }

        fn runner(path: PathBuf) -> ProcessRunner {
            ProcessRunner::new(path).with_interpreter(Some("sh".to_string()))
        }

        #[tokio::test]
        async fn test_run_captures_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(
                &dir,
                "echo SESSION_REMAINING=42\necho WEEKLY_REMAINING=88",
            );

            let output = runner(script).run().await.unwrap();
            let stdout = String::from_utf8(output.stdout).unwrap();
            assert_eq!(stdout, "SESSION_REMAINING=42\nWEEKLY_REMAINING=88\n");
        }

        #[tokio::test]
        async fn test_run_in_script_directory() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(&dir, "pwd -P");

            let output = runner(script).run().await.unwrap();
            let cwd = String::from_utf8(output.stdout).unwrap();
            let expected = dir.path().canonicalize().unwrap();
            assert_eq!(PathBuf::from(cwd.trim()), expected);
        }

        #[tokio::test]
        async fn test_nonzero_exit() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(&dir, "echo 'disk full' >&2\nexit 1");

            let err = runner(script).run().await.unwrap_err();
            assert!(matches!(err, RunError::Exit { code: 1, .. }));
            assert_eq!(err.to_string(), "Script exit 1: disk full");
        }

        #[tokio::test]
        async fn test_timeout_kills_script() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(&dir, "sleep 30");

            let start = Instant::now();
            let err = runner(script)
                .with_timeout(Duration::from_millis(200))
                .run()
                .await
                .unwrap_err();
            assert!(matches!(err, RunError::Timeout(_)));
            assert!(start.elapsed() < Duration::from_secs(10));
        }

        #[tokio::test]
        async fn test_spawn_failure() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(&dir, "true");

            let err = ProcessRunner::new(script)
                .with_interpreter(Some("/nonexistent/usagebar-shell".to_string()))
                .run()
                .await
                .unwrap_err();
            assert!(matches!(err, RunError::Spawn(_)));
            assert!(err.to_string().starts_with("NotFound: "), "{err}");
        }
    }
}
