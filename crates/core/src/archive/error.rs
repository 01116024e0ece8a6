//! Error types for the archive module.

use std::path::PathBuf;
use thiserror::Error;

use crate::capabilities::UnsupportedFormat;
use crate::tool::ToolError;

/// Errors that can occur while flattening or repackaging an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Requested target cannot be created.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFormat),

    /// 7-Zip failed, was cancelled or timed out.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Staging or output filesystem operation failed.
    #[error("{operation} failed for {path}: {source}")]
    FileSystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive contains archives nested deeper than allowed.
    #[error("Archive nesting exceeds {max_depth} levels at {path}")]
    NestingTooDeep { path: PathBuf, max_depth: usize },

    /// Flattening needed more extraction passes than allowed.
    #[error("Archive needed more than {limit} extraction passes")]
    TooManyExtractions { limit: usize },
}

impl ArchiveError {
    /// Creates a filesystem error.
    pub fn fs(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Tool(ToolError::Cancelled))
    }
}
