//! Archive repackaging.
//!
//! Converting an archive to another archive format is done in two stages:
//!
//! 1. **Flatten**: the input is extracted into a staging directory, and every
//!    archive that shows up there is extracted in turn (and then deleted),
//!    until only plain files remain.
//! 2. **Compress**: the staging directory is packed into the target format.
//!    Container formats (`zip`, `7z`, `tar`) take the directory as-is.
//!    Single-stream formats (`gz`, `bz2`, `xz`) first get an intermediate
//!    `.tar` which is then compressed.
//!
//! Every step shells out to 7-Zip through a [`ToolRunner`](crate::tool::ToolRunner).
//!
//! # Example
//!
//! ```ignore
//! use fileforge_core::archive::ArchiveRepackager;
//! use fileforge_core::tool::ProcessToolRunner;
//!
//! let repackager = ArchiveRepackager::new(Arc::new(ProcessToolRunner::new()), "7zz");
//! let output = repackager
//!     .repackage(Path::new("/in/photos.tar.gz"), "zip", Path::new("/out/archives"), &cancel)
//!     .await?;
//! assert_eq!(output, PathBuf::from("/out/archives/photos.zip"));
//! ```

mod error;
mod repackager;
mod staging;
mod stem;

pub use error::ArchiveError;
pub use repackager::{ArchiveRepackager, ExtractionReport};
pub use staging::StagingDir;
pub use stem::clean_stem;
