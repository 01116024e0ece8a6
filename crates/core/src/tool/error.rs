//! Error types for external tool invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The executable could not be started (missing, not executable, ...).
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited with a non-zero code.
    #[error("{stderr}")]
    InvocationFailed {
        program: PathBuf,
        exit_code: i32,
        stderr: String,
    },

    /// The process exceeded the configured timeout and was killed.
    #[error("{program} timed out after {timeout_secs} seconds")]
    Timeout { program: PathBuf, timeout_secs: u64 },

    /// The invocation was cancelled and the process was killed.
    #[error("Conversion cancelled")]
    Cancelled,
}

impl ToolError {
    /// Creates an invocation failure, falling back to a generic message when
    /// the tool wrote nothing to stderr.
    pub fn invocation_failed(program: impl Into<PathBuf>, exit_code: i32, stderr: &str) -> Self {
        let stderr = stderr.trim();
        Self::InvocationFailed {
            program: program.into(),
            exit_code,
            stderr: if stderr.is_empty() {
                format!("exit code {}", exit_code)
            } else {
                stderr.to_string()
            },
        }
    }

    /// Whether the executable itself was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Exit code of a failed invocation, if the process ran.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::InvocationFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}
