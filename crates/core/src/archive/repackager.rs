//! Recursive flattening and re-compression through 7-Zip.

use std::collections::{HashSet, VecDeque};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::ArchiveError;
use super::staging::StagingDir;
use super::stem::clean_stem;
use crate::capabilities::archive::{creatable, is_extractable, ArchiveDescriptor, ArchiveKind};
use crate::capabilities::normalize_token;
use crate::config::ArchiveConfig;
use crate::metrics::{ARCHIVE_EXTRACTIONS, ARCHIVE_LIMIT_HITS};
use crate::tool::{ToolInvocation, ToolRunner};

/// Summary of one flattening run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of 7-Zip extraction passes.
    pub extractions: usize,
    /// Deepest nesting level that was extracted (the input is level 0).
    pub max_depth_reached: usize,
}

/// Flattens nested archives into a staging directory and re-compresses the
/// result into a target format.
pub struct ArchiveRepackager<R: ToolRunner + ?Sized> {
    runner: Arc<R>,
    seven_zip: PathBuf,
    max_depth: usize,
    max_extractions: usize,
}

impl<R: ToolRunner + ?Sized> ArchiveRepackager<R> {
    /// Creates a repackager driving the 7-Zip binary at `seven_zip`.
    pub fn new(runner: Arc<R>, seven_zip: impl Into<PathBuf>) -> Self {
        let limits = ArchiveConfig::default();
        Self {
            runner,
            seven_zip: seven_zip.into(),
            max_depth: limits.max_depth,
            max_extractions: limits.max_extractions,
        }
    }

    /// Applies flattening limits from configuration.
    pub fn with_limits(mut self, limits: &ArchiveConfig) -> Self {
        self.max_depth = limits.max_depth;
        self.max_extractions = limits.max_extractions;
        self
    }

    pub fn seven_zip_path(&self) -> &Path {
        &self.seven_zip
    }

    /// Extracts `input` into `staging_dir`, then keeps extracting every
    /// archive that appears there until only non-archive files remain.
    ///
    /// Entries are processed breadth-first. Extracted archives are deleted
    /// once expanded; `input` itself is never touched. A path is queued once,
    /// unless an archive at that path was expanded, deleted and later
    /// re-created by another extraction, in which case it is queued again one
    /// level deeper.
    pub async fn extract_recursive(
        &self,
        input: &Path,
        staging_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExtractionReport, ArchiveError> {
        let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::from([(input.to_path_buf(), 0)]);
        let mut seen: HashSet<PathBuf> = HashSet::from([input.to_path_buf()]);
        let mut report = ExtractionReport::default();

        while let Some((current, depth)) = queue.pop_front() {
            if !is_extractable(&current) || !is_regular_file(&current).await {
                continue;
            }

            if depth > self.max_depth {
                ARCHIVE_LIMIT_HITS.with_label_values(&["depth"]).inc();
                warn!(path = %current.display(), depth, max_depth = self.max_depth, "Archive nesting limit reached");
                return Err(ArchiveError::NestingTooDeep {
                    path: current,
                    max_depth: self.max_depth,
                });
            }

            if report.extractions >= self.max_extractions {
                ARCHIVE_LIMIT_HITS.with_label_values(&["extractions"]).inc();
                warn!(path = %input.display(), limit = self.max_extractions, "Archive extraction limit reached");
                return Err(ArchiveError::TooManyExtractions {
                    limit: self.max_extractions,
                });
            }

            debug!(path = %current.display(), depth, "Extracting archive");
            self.extract_into(&current, staging_dir, cancel).await?;
            report.extractions += 1;
            report.max_depth_reached = report.max_depth_reached.max(depth);
            ARCHIVE_EXTRACTIONS.inc();

            for entry in list_sorted(staging_dir).await? {
                if entry == current {
                    continue;
                }
                if seen.insert(entry.clone()) {
                    queue.push_back((entry, depth + 1));
                }
            }

            if current != input {
                tokio::fs::remove_file(&current)
                    .await
                    .map_err(|e| ArchiveError::fs("remove extracted archive", &current, e))?;
                seen.remove(&current);
            }
        }

        Ok(report)
    }

    /// Converts `input` into `target`, writing the result into `output_dir`.
    ///
    /// Returns the path of the produced archive. Existing files are never
    /// replaced: when `<stem>.<target>` is taken the archive is written as
    /// `<stem> (1).<target>`, and so on. The staging directory
    /// `<output_dir>/<stem>_tmp` is gone when this returns, on success and on
    /// failure.
    pub async fn repackage(
        &self,
        input: &Path,
        target: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ArchiveError> {
        let descriptor = creatable(target)?;
        let target = normalize_token(target);
        let stem = clean_stem(input);

        let staging = StagingDir::create(output_dir.join(format!("{}_tmp", stem))).await?;
        let result = self
            .flatten_and_compress(input, &target, descriptor, &stem, staging.path(), output_dir, cancel)
            .await;
        staging.remove().await;

        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn flatten_and_compress(
        &self,
        input: &Path,
        target: &str,
        descriptor: &ArchiveDescriptor,
        stem: &str,
        staging: &Path,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ArchiveError> {
        let report = self.extract_recursive(input, staging, cancel).await?;
        info!(
            path = %input.display(),
            extractions = report.extractions,
            depth = report.max_depth_reached,
            "Archive flattened"
        );

        let output = match descriptor.kind {
            ArchiveKind::Container => {
                let output = free_output_path(output_dir, stem, target).await;

                let create = ToolInvocation::new(&self.seven_zip)
                    .args(["a", descriptor.type_flag])
                    .arg(&output)
                    .arg("*")
                    .current_dir(staging);
                self.runner.run(&create, cancel).await?;
                output
            }
            ArchiveKind::SingleStream => {
                let tarball = staging.join(format!("{}.tar", stem));
                let bundle = ToolInvocation::new(&self.seven_zip)
                    .args(["a", "-ttar"])
                    .arg(&tarball)
                    .arg("*")
                    .current_dir(staging);
                self.runner.run(&bundle, cancel).await?;

                let output = free_output_path(output_dir, stem, &format!("tar.{}", target)).await;

                let compress = ToolInvocation::new(&self.seven_zip)
                    .args(["a", descriptor.type_flag])
                    .arg(&output)
                    .arg(&tarball);
                self.runner.run(&compress, cancel).await?;
                output
            }
        };

        info!(output = %output.display(), "Archive created");
        Ok(output)
    }

    async fn extract_into(
        &self,
        archive: &Path,
        staging_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ArchiveError> {
        let mut out_flag = OsString::from("-o");
        out_flag.push(staging_dir);

        let extract = ToolInvocation::new(&self.seven_zip)
            .arg("x")
            .arg(archive)
            .arg(out_flag)
            .arg("-y");
        self.runner.run(&extract, cancel).await?;
        Ok(())
    }
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Top-level entries of `dir`, sorted by path.
async fn list_sorted(dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ArchiveError::fs("list staging directory", dir, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| ArchiveError::fs("list staging directory", dir, e))?
    {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// First of `<stem>.<ext>`, `<stem> (1).<ext>`, ... that does not exist in
/// `dir`.
///
/// 7-Zip `a` appends to an existing archive, and an existing file may be the
/// input itself or an earlier item of the same batch, so nothing is replaced.
async fn free_output_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{}.{}", stem, extension));
    let mut n = 1;
    while tokio::fs::symlink_metadata(&candidate).await.is_ok() {
        candidate = dir.join(format!("{} ({}).{}", stem, n, extension));
        n += 1;
    }
    if n > 1 {
        debug!(path = %candidate.display(), "Output name taken, using next free name");
    }
    candidate
}
