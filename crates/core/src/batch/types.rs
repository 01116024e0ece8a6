//! Batch request and result types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capabilities::{normalize_token, Domain};

/// Message recorded for items that were not run because the batch was
/// cancelled.
pub const CANCELLED_MESSAGE: &str = "Conversion cancelled";

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub path: PathBuf,
    /// Target format token. The domain default applies when absent.
    #[serde(
        default,
        rename = "targetFormat",
        alias = "target_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_format: Option<String>,
}

impl ConversionRequest {
    pub fn new(path: impl Into<PathBuf>, target_format: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target_format: Some(target_format.into()),
        }
    }

    /// Request without a target; the domain default will be used.
    pub fn with_default_target(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            target_format: None,
        }
    }

    /// Lower-cased target, falling back to the domain default.
    pub fn resolved_target(&self, domain: Domain) -> String {
        match self.target_format.as_deref().map(normalize_token) {
            Some(token) if !token.is_empty() => token,
            _ => domain.default_target().to_string(),
        }
    }
}

/// A produced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub path: PathBuf,
}

/// An item that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEntry {
    #[serde(rename = "sourcePath")]
    pub source_path: PathBuf,
    pub message: String,
    /// Always false; kept so clients can tell entries apart by shape.
    pub success: bool,
}

impl FailedEntry {
    pub fn new(source_path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            message: message.into(),
            success: false,
        }
    }
}

/// Per-item result, in the same position as the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutput {
    Converted(OutputEntry),
    Failed(FailedEntry),
}

impl BatchOutput {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of a batch call.
///
/// `success` reports whether the batch ran at all. Individual failures are
/// listed in `outputs` and summarised in `message` while `success` stays
/// true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    #[serde(default)]
    pub outputs: Vec<BatchOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchResult {
    /// Result of a batch that ran to the end.
    pub fn completed(outputs: Vec<BatchOutput>) -> Self {
        let failed = outputs.iter().filter(|o| o.is_failed()).count();
        let message = (failed > 0).then(|| {
            format!("{} of {} files could not be converted.", failed, outputs.len())
        });

        Self {
            success: true,
            outputs,
            message,
        }
    }

    /// Result of a batch rejected before any item ran.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            outputs: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.outputs.iter().any(BatchOutput::is_failed)
    }

    pub fn failed_entries(&self) -> impl Iterator<Item = &FailedEntry> {
        self.outputs.iter().filter_map(|o| match o {
            BatchOutput::Failed(entry) => Some(entry),
            BatchOutput::Converted(_) => None,
        })
    }

    /// Paths of produced files.
    pub fn output_paths(&self) -> impl Iterator<Item = &Path> {
        self.outputs.iter().filter_map(|o| match o {
            BatchOutput::Converted(entry) => Some(entry.path.as_path()),
            BatchOutput::Failed(_) => None,
        })
    }
}
