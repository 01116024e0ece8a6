//! Scratch directory owned by a single archive item.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::ArchiveError;

/// A staging directory that is removed when the item finishes.
///
/// Call [`StagingDir::remove`] on the normal path. If the guard is dropped
/// without it (panic, cancelled future), removal happens synchronously in
/// `Drop`.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    removed: bool,
}

impl StagingDir {
    /// Creates `path` fresh, discarding leftovers of an earlier run.
    pub async fn create(path: PathBuf) -> Result<Self, ArchiveError> {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Removing stale staging directory");
            tokio::fs::remove_dir_all(&path)
                .await
                .map_err(|e| ArchiveError::fs("remove stale staging directory", &path, e))?;
        }

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ArchiveError::fs("create staging directory", &path, e))?;

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory. Failures are logged, never returned.
    pub async fn remove(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove staging directory");
            }
        }
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove staging directory");
            }
        }
    }
}
