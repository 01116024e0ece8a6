//! Audio/video conversion through ffmpeg.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::ConvertError;
use super::traits::ConversionStep;
use super::{ensure_input, output_stem};
use crate::capabilities::media::{self, MediaDescriptor};
use crate::capabilities::Domain;
use crate::config::ToolsConfig;
use crate::tool::{ToolInvocation, ToolRunner};

/// Converts media files with ffmpeg using the media capability table.
pub struct MediaStep {
    runner: Arc<dyn ToolRunner>,
    ffmpeg: PathBuf,
    log_level: String,
}

impl MediaStep {
    pub fn new(runner: Arc<dyn ToolRunner>, tools: &ToolsConfig) -> Self {
        Self {
            runner,
            ffmpeg: tools.ffmpeg_path.clone(),
            log_level: tools.ffmpeg_log_level.clone(),
        }
    }

    /// Builds the ffmpeg command line for one conversion.
    pub fn invocation(
        &self,
        input: &Path,
        descriptor: &MediaDescriptor,
        output: &Path,
    ) -> ToolInvocation {
        let mut inv = ToolInvocation::new(&self.ffmpeg)
            .args(["-y", "-i"])
            .arg(input)
            .args(["-f", descriptor.container]);

        if let Some(video) = descriptor.video_codec {
            inv = inv.args(["-c:v", video]);
        }
        inv = match descriptor.audio_codec {
            Some(audio) => inv.args(["-c:a", audio]),
            None => inv.arg("-an"),
        };

        inv.args(["-loglevel", self.log_level.as_str()]).arg(output)
    }
}

#[async_trait]
impl ConversionStep for MediaStep {
    fn domain(&self) -> Domain {
        Domain::Media
    }

    async fn convert(
        &self,
        input: &Path,
        target: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ConvertError> {
        ensure_input(input).await?;
        let descriptor = media::descriptor(target)?;

        let output = output_dir.join(format!("{}.{}", output_stem(input), descriptor.extension));
        let invocation = self.invocation(input, descriptor, &output);
        debug!(input = %input.display(), output = %output.display(), "Converting media");

        self.runner.run(&invocation, cancel).await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::FakeTools;
    use crate::testing::MockToolRunner;
    use tempfile::TempDir;

    fn step() -> (MediaStep, Arc<MockToolRunner>) {
        let runner = Arc::new(MockToolRunner::with_handler(FakeTools::new().handler()));
        (MediaStep::new(runner.clone(), &ToolsConfig::default()), runner)
    }

    #[tokio::test]
    async fn test_video_conversion_arguments() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mov");
        std::fs::write(&input, b"video").unwrap();

        let (step, runner) = step();
        let output = step
            .convert(&input, "mkv", dir.path(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output, dir.path().join("clip.mkv"));
        let calls = runner.recorded_invocations().await;
        assert_eq!(
            calls[0].args_lossy(),
            vec![
                "-y".to_string(),
                "-i".to_string(),
                input.display().to_string(),
                "-f".to_string(),
                "matroska".to_string(),
                "-c:v".to_string(),
                "libx264".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-loglevel".to_string(),
                "error".to_string(),
                output.display().to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_gif_drops_audio() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"video").unwrap();

        let (step, runner) = step();
        step.convert(&input, "gif", dir.path(), &CancellationToken::new())
            .await
            .unwrap();

        let calls = runner.recorded_invocations().await;
        assert!(calls[0].has_arg("-an"));
        assert!(!calls[0].has_arg("-c:a"));
    }

    #[tokio::test]
    async fn test_hevc_output_extension() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.avi");
        std::fs::write(&input, b"video").unwrap();

        let (step, _) = step();
        let output = step
            .convert(&input, "hevc_mp4", dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output, dir.path().join("clip.mp4"));
    }

    #[tokio::test]
    async fn test_unknown_target_fails_without_invoking() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("song.wav");
        std::fs::write(&input, b"audio").unwrap();

        let (step, runner) = step();
        let err = step
            .convert(&input, "xyz", dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::Unsupported(_)));
        assert_eq!(runner.invocation_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let (step, _) = step();
        let err = step
            .convert(&dir.path().join("gone.mp3"), "wav", dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound { .. }));
    }
}
