//! Trait definitions for the convert module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use super::error::ConvertError;
use crate::capabilities::Domain;

/// Converts one file for one domain.
///
/// The batch runner calls this once per item, strictly one item at a time.
#[async_trait]
pub trait ConversionStep: Send + Sync {
    /// Domain this step serves.
    fn domain(&self) -> Domain;

    /// Converts `input` to `target`, writing into `output_dir`.
    ///
    /// Returns the path of the produced file.
    async fn convert(
        &self,
        input: &Path,
        target: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ConvertError>;
}
