//! Error types for the convert module.

use std::path::PathBuf;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::capabilities::UnsupportedFormat;
use crate::tool::ToolError;

/// Why a single batch item could not be converted.
///
/// The `Display` output is what ends up in the failed entry and the `error`
/// status event for the item.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input path does not exist or is not a file.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Source or target format not supported by the domain.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFormat),

    /// External tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Archive flattening or repackaging failed.
    #[error(transparent)]
    Archive(ArchiveError),

    /// The tool exited successfully but the expected file is missing.
    #[error("Expected output was not produced: {path}")]
    OutputMissing { path: PathBuf },
}

impl ConvertError {
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    /// Whether the item stopped because the batch was cancelled.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Tool(e) => matches!(e, ToolError::Cancelled),
            Self::Archive(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

impl From<ArchiveError> for ConvertError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Unsupported(e) => Self::Unsupported(e),
            other => Self::Archive(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Domain;

    #[test]
    fn test_message_is_tool_stderr() {
        let err: ConvertError = ToolError::invocation_failed("ffmpeg", 1, "Invalid data found").into();
        assert_eq!(err.to_string(), "Invalid data found");
    }

    #[test]
    fn test_archive_unsupported_is_flattened() {
        let err: ConvertError =
            ArchiveError::Unsupported(UnsupportedFormat::extract_only("rar")).into();
        assert!(matches!(err, ConvertError::Unsupported(ref e) if e.domain == Domain::Archive));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ConvertError::Tool(ToolError::Cancelled).is_cancelled());
        assert!(ConvertError::from(ArchiveError::Tool(ToolError::Cancelled)).is_cancelled());
        assert!(!ConvertError::input_not_found("/x").is_cancelled());
    }
}
