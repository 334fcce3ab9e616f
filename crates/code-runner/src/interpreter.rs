use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One interpreter invocation: a script, the document fed to its stdin and a
/// wall-clock limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub script: String,
    pub stdin: String,
    pub time_limit: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    #[error("interpreter '{0}' was not found")]
    NotFound(String),
    #[error("failed to prepare a scratch directory: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("failed to start interpreter: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to collect interpreter output: {0}")]
    Io(#[source] std::io::Error),
    #[error("execution timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

/// The process boundary the runner executes harness scripts through.
///
/// Kept as a trait so the run state machine can be exercised without a real
/// interpreter installed.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn execute(&self, request: ExecRequest) -> Result<ProcessOutput, InterpreterError>;
}

/// Runs scripts with a local CPython, one fresh process per request.
///
/// Each process starts in isolated mode with an empty environment and an
/// empty scratch directory that is removed afterwards. Denying filesystem or
/// network access beyond that is the job of the hosting sandbox.
#[derive(Debug, Clone)]
pub struct PythonInterpreter {
    program: String,
}

impl PythonInterpreter {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether the configured interpreter can be found.
    pub fn is_available(&self) -> bool {
        self.resolve().is_ok()
    }

    fn resolve(&self) -> Result<PathBuf, InterpreterError> {
        which::which(&self.program).map_err(|_| InterpreterError::NotFound(self.program.clone()))
    }
}

impl Default for PythonInterpreter {
    fn default() -> Self {
        Self::new("python3")
    }
}

#[async_trait]
impl Interpreter for PythonInterpreter {
    async fn execute(&self, request: ExecRequest) -> Result<ProcessOutput, InterpreterError> {
        let program = self.resolve()?;
        let scratch = tempfile::tempdir().map_err(InterpreterError::Workspace)?;

        let mut command = Command::new(&program);
        command
            .args(["-I", "-S", "-B", "-c", &request.script])
            .env_clear()
            .env("PYTHONHASHSEED", "0")
            .env("PYTHONIOENCODING", "utf-8")
            .current_dir(scratch.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        if let Some(root) = std::env::var_os("SYSTEMROOT") {
            command.env("SYSTEMROOT", root);
        }

        let mut child = command.spawn().map_err(InterpreterError::Spawn)?;
        tracing::debug!(program = %program.display(), pid = ?child.id(), "Interpreter started");

        if let Some(mut stdin) = child.stdin.take() {
            let document = request.stdin;
            tokio::spawn(async move {
                // A child that dies early closes its stdin; its stderr tells the story.
                if let Err(e) = stdin.write_all(document.as_bytes()).await {
                    tracing::debug!("Failed to feed interpreter stdin: {}", e);
                }
            });
        }

        let output = tokio::time::timeout(request.time_limit, child.wait_with_output())
            .await
            .map_err(|_| InterpreterError::TimedOut(request.time_limit))?
            .map_err(InterpreterError::Io)?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
