//! Still and animated image conversion through ffmpeg's image encoders.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::ConvertError;
use super::traits::ConversionStep;
use super::{ensure_input, output_stem};
use crate::capabilities::image::{self, ImageDescriptor};
use crate::capabilities::Domain;
use crate::config::ToolsConfig;
use crate::tool::{ToolInvocation, ToolRunner};

pub struct ImageStep {
    runner: Arc<dyn ToolRunner>,
    ffmpeg: PathBuf,
    log_level: String,
}

impl ImageStep {
    pub fn new(runner: Arc<dyn ToolRunner>, tools: &ToolsConfig) -> Self {
        Self {
            runner,
            ffmpeg: tools.ffmpeg_path.clone(),
            log_level: tools.ffmpeg_log_level.clone(),
        }
    }

    pub fn invocation(
        &self,
        input: &Path,
        descriptor: &ImageDescriptor,
        output: &Path,
    ) -> ToolInvocation {
        let mut inv = ToolInvocation::new(&self.ffmpeg).args(["-y", "-i"]).arg(input);

        // Still formats keep only the first frame of animated sources.
        if !descriptor.animated {
            inv = inv.args(["-frames:v", "1"]);
        }

        inv.args(["-c:v", descriptor.encoder])
            .args(["-loglevel", self.log_level.as_str()])
            .arg(output)
    }
}

#[async_trait]
impl ConversionStep for ImageStep {
    fn domain(&self) -> Domain {
        Domain::Image
    }

    async fn convert(
        &self,
        input: &Path,
        target: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ConvertError> {
        ensure_input(input).await?;
        let descriptor = image::descriptor(target)?;

        let output = output_dir.join(format!("{}.{}", output_stem(input), descriptor.extension));
        debug!(input = %input.display(), encoder = descriptor.encoder, "Converting image");

        self.runner
            .run(&self.invocation(input, descriptor, &output), cancel)
            .await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::FakeTools;
    use crate::testing::MockToolRunner;
    use tempfile::TempDir;

    async fn convert(name: &str, target: &str) -> (PathBuf, ToolInvocation) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join(name);
        std::fs::write(&input, b"pixels").unwrap();

        let runner = Arc::new(MockToolRunner::with_handler(FakeTools::new().handler()));
        let step = ImageStep::new(runner.clone(), &ToolsConfig::default());
        let output = step
            .convert(&input, target, dir.path(), &CancellationToken::new())
            .await
            .unwrap();

        let call = runner.recorded_invocations().await.remove(0);
        (output.strip_prefix(dir.path()).unwrap().to_path_buf(), call)
    }

    #[tokio::test]
    async fn test_png_takes_single_frame() {
        let (output, call) = convert("photo.jpg", "png").await;
        assert_eq!(output, PathBuf::from("photo.png"));
        assert!(call.has_arg("-frames:v"));
        assert!(call.has_arg("png"));
    }

    #[tokio::test]
    async fn test_gif_keeps_all_frames() {
        let (output, call) = convert("anim.webp", "gif").await;
        assert_eq!(output, PathBuf::from("anim.gif"));
        assert!(!call.has_arg("-frames:v"));
    }

    #[tokio::test]
    async fn test_heic_written_as_jpeg() {
        let (output, call) = convert("scan.tiff", "HEIC").await;
        assert_eq!(output, PathBuf::from("scan.jpg"));
        assert!(call.has_arg("mjpeg"));
    }
}
