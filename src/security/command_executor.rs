//! ScriptExecutor: whitelisted execution of browser-automation scripts
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only pre-approved script runtimes can execute
//! - **Injection prevention**: Uses `tokio::process::Command`, never a shell
//! - **Secrets on stdin**: The job payload is written to the child's stdin, so
//!   credentials never appear in the process list
//! - **Timeout control**: Hanging browsers are killed after the timeout
//!
//! # Example
//!
//! ```rust,no_run
//! use video_publisher::ScriptExecutor;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), video_publisher::CommandError> {
//! let mut executor = ScriptExecutor::new(std::env::temp_dir())?;
//! executor.set_timeout(Duration::from_secs(30));
//!
//! let output = executor.execute("node", &["post.js"], b"{}").await?;
//! println!("{}", String::from_utf8_lossy(&output.stdout));
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Script runtimes allowed to run automation scripts
const ALLOWED_RUNTIMES: &[&str] = &["node", "deno", "bun"];

/// Errors that can occur during script execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Runtime is not in the allowed whitelist
    #[error("Runtime '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Process could not be spawned or its pipes failed
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Script exceeded the timeout duration and was killed
    #[error("Command timeout after {0:?}")]
    Timeout(Duration),
}

/// Executor for automation scripts
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptExecutor {
    /// Create a new ScriptExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self {
            working_dir,
            timeout: None,
        })
    }

    /// Set script execution timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn is_allowed(runtime: &str) -> bool {
        ALLOWED_RUNTIMES.contains(&runtime)
    }

    /// Run `runtime args...`, feed `stdin` and collect the output.
    ///
    /// A non-zero exit status is not an error here; callers interpret the
    /// script's output themselves.
    ///
    /// # Errors
    ///
    /// - `CommandError::CommandNotAllowed` - Runtime not in whitelist
    /// - `CommandError::ExecutionFailed` - Binary not found or pipe error
    /// - `CommandError::Timeout` - Script ran longer than the timeout
    pub async fn execute(&self, runtime: &str, args: &[&str], stdin: &[u8]) -> Result<Output, CommandError> {
        if !Self::is_allowed(runtime) {
            return Err(CommandError::CommandNotAllowed(runtime.to_string()));
        }

        let mut child = Command::new(runtime)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        if let Some(mut child_stdin) = child.stdin.take() {
            child_stdin
                .write_all(stdin)
                .await
                .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
            // Dropping stdin closes the pipe so the script sees EOF
        }

        let wait = child.wait_with_output();

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, wait)
                .await
                .map_err(|_| CommandError::Timeout(timeout))?,
            None => wait.await,
        };

        output.map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_dir() -> PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn test_allowed_runtimes() {
        assert!(ScriptExecutor::is_allowed("node"));
        assert!(ScriptExecutor::is_allowed("deno"));
        assert!(ScriptExecutor::is_allowed("bun"));
        assert!(!ScriptExecutor::is_allowed("sh"));
        assert!(!ScriptExecutor::is_allowed("python"));
    }

    #[tokio::test]
    async fn test_rejected_command_rm() {
        let executor = ScriptExecutor::new(get_test_dir()).unwrap();
        let result = executor.execute("rm", &["-rf", "/"], b"").await;
        assert!(
            matches!(result, Err(CommandError::CommandNotAllowed(_))),
            "rm should be rejected as not in whitelist"
        );
    }

    #[tokio::test]
    async fn test_rejected_shell() {
        let executor = ScriptExecutor::new(get_test_dir()).unwrap();
        let result = executor.execute("sh", &["-c", "echo pwned"], b"").await;
        assert!(matches!(result, Err(CommandError::CommandNotAllowed(_))));
    }

    #[test]
    fn test_invalid_working_directory() {
        let result = ScriptExecutor::new("/nonexistent/directory/that/does/not/exist");
        assert!(
            matches!(result, Err(CommandError::InvalidWorkingDirectory(_))),
            "Should reject non-existent working directory"
        );
    }

    #[test]
    fn test_set_timeout() {
        let mut executor = ScriptExecutor::new(get_test_dir()).unwrap();
        executor.set_timeout(Duration::from_secs(5));
        assert_eq!(executor.timeout, Some(Duration::from_secs(5)));
        assert_eq!(executor.working_dir(), get_test_dir().as_path());
    }
}
