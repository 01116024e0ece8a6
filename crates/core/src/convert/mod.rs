//! Per-domain conversion steps.
//!
//! A [`ConversionStep`] turns one input file into one output file for a
//! single domain. Steps never touch batch state; the batch runner drives them
//! one item at a time and turns their errors into failed entries.
//!
//! | Domain   | Step           | Tool        |
//! |----------|----------------|-------------|
//! | media    | [`MediaStep`]    | ffmpeg      |
//! | image    | [`ImageStep`]    | ffmpeg      |
//! | document | [`DocumentStep`] | LibreOffice |
//! | archive  | [`ArchiveStep`]  | 7-Zip       |

mod archive;
mod document;
mod error;
mod image;
mod media;
mod traits;

pub use archive::ArchiveStep;
pub use document::DocumentStep;
pub use error::ConvertError;
pub use image::ImageStep;
pub use media::MediaStep;
pub use traits::ConversionStep;

use std::path::Path;
use std::sync::Arc;

use crate::capabilities::Domain;
use crate::config::Config;
use crate::tool::ToolRunner;

/// Builds the step for `domain` from configuration.
pub fn step_for(domain: Domain, runner: Arc<dyn ToolRunner>, config: &Config) -> Arc<dyn ConversionStep> {
    match domain {
        Domain::Media => Arc::new(MediaStep::new(runner, &config.tools)),
        Domain::Image => Arc::new(ImageStep::new(runner, &config.tools)),
        Domain::Document => Arc::new(DocumentStep::new(runner, &config.tools)),
        Domain::Archive => Arc::new(ArchiveStep::new(runner, &config.tools, &config.archive)),
    }
}

/// File name without its final extension.
pub fn output_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

/// Fails with `InputNotFound` unless `path` is an existing file.
pub(crate) async fn ensure_input(path: &Path) -> Result<(), ConvertError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(ConvertError::input_not_found(path)),
    }
}
