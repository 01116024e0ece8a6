use std::path::PathBuf;
use thiserror::Error;

/// Errors that reject a whole batch before any item runs.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No files provided.")]
    EmptyBatch,

    /// Required setting missing (output folder).
    #[error("{reason}")]
    Configuration { reason: String },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BatchError {
    pub fn missing_output_folder() -> Self {
        Self::Configuration {
            reason: "No output folder defined in setup.".to_string(),
        }
    }
}
