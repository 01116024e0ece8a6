//! Archive-to-archive conversion.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::ensure_input;
use super::error::ConvertError;
use super::traits::ConversionStep;
use crate::archive::ArchiveRepackager;
use crate::capabilities::Domain;
use crate::config::{ArchiveConfig, ToolsConfig};
use crate::tool::ToolRunner;

/// Delegates each item to an [`ArchiveRepackager`].
pub struct ArchiveStep {
    repackager: ArchiveRepackager<dyn ToolRunner>,
}

impl ArchiveStep {
    pub fn new(runner: Arc<dyn ToolRunner>, tools: &ToolsConfig, limits: &ArchiveConfig) -> Self {
        Self {
            repackager: ArchiveRepackager::new(runner, tools.seven_zip_path.clone())
                .with_limits(limits),
        }
    }
}

#[async_trait]
impl ConversionStep for ArchiveStep {
    fn domain(&self) -> Domain {
        Domain::Archive
    }

    async fn convert(
        &self,
        input: &Path,
        target: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ConvertError> {
        ensure_input(input).await?;
        Ok(self
            .repackager
            .repackage(input, target, output_dir, cancel)
            .await?)
    }
}
