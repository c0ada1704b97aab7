use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    #[error("{program} failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExternalResult<T> = Result<T, ExternalError>;

/// Output from an external command
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn into_failure(self, program: &str) -> ExternalError {
        ExternalError::CommandFailed {
            program: program.to_string(),
            code: self.status.code(),
            stderr: self.stderr.trim().to_string(),
        }
    }
}

/// A located external binary (pdftotext, tesseract, ocrmypdf).
#[derive(Debug, Clone)]
pub struct ExternalTool {
    name: String,
    program: PathBuf,
}

impl ExternalTool {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool and capture its output, whatever the exit status.
    pub async fn run<I, A>(&self, args: I) -> ExternalResult<CommandOutput>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        tracing::debug!(tool = %self.name, program = %self.program.display(), ?args, "Running external tool");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ExternalError::CommandNotFound(self.program.display().to_string())
                }
                _ => ExternalError::Io(e),
            })?;

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run the tool and treat any non-zero exit as an error.
    pub async fn run_checked<I, A>(&self, args: I) -> ExternalResult<CommandOutput>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let output = self.run(args).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(output.into_failure(&self.name))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let tool = ExternalTool::new("echo", "echo");

        let output = tool.run(["hello"]).await.unwrap();

        assert!(output.success());
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_run_checked_reports_exit_code() {
        let tool = ExternalTool::new("sh", "sh");

        let result = tool.run_checked(["-c", "echo broken >&2; exit 3"]).await;

        match result {
            Err(ExternalError::CommandFailed { program, code, stderr }) => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let tool = ExternalTool::new("ghost", "/nonexistent/bin/ghost-tool");

        let result = tool.run(["x"]).await;

        assert!(matches!(result, Err(ExternalError::CommandNotFound(_))));
    }
}
