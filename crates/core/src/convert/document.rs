//! Office document conversion through LibreOffice in headless mode.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::ConvertError;
use super::traits::ConversionStep;
use super::{ensure_input, output_stem};
use crate::capabilities::{document, extension_of, Domain};
use crate::config::ToolsConfig;
use crate::tool::{ToolInvocation, ToolRunner};

pub struct DocumentStep {
    runner: Arc<dyn ToolRunner>,
    soffice: PathBuf,
}

impl DocumentStep {
    pub fn new(runner: Arc<dyn ToolRunner>, tools: &ToolsConfig) -> Self {
        Self {
            runner,
            soffice: tools.libreoffice_path.clone(),
        }
    }
}

#[async_trait]
impl ConversionStep for DocumentStep {
    fn domain(&self) -> Domain {
        Domain::Document
    }

    async fn convert(
        &self,
        input: &Path,
        target: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ConvertError> {
        ensure_input(input).await?;

        let extension = extension_of(input).unwrap_or_default();
        let target = document::check(&extension, target)?;

        let invocation = ToolInvocation::new(&self.soffice)
            .args(["--headless", "--convert-to", target.as_str(), "--outdir"])
            .arg(output_dir)
            .arg(input);
        debug!(input = %input.display(), target = %target, "Converting document");

        self.runner.run(&invocation, cancel).await?;

        // LibreOffice exits 0 for some failed conversions.
        let output = output_dir.join(format!("{}.{}", output_stem(input), target));
        if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
            warn!(output = %output.display(), "LibreOffice reported success without output");
            return Err(ConvertError::OutputMissing { path: output });
        }

        Ok(output)
    }
}
