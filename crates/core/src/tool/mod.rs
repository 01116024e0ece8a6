//! External tool invocation.
//!
//! Every conversion in this crate ends up as one or more runs of an external
//! command-line program (ffmpeg, 7-Zip, LibreOffice). This module owns that
//! boundary: a `ToolInvocation` describes the program, arguments and working
//! directory, and a `ToolRunner` runs it to completion.
//!
//! A run succeeds on exit code 0. A non-zero exit becomes
//! `ToolError::InvocationFailed` carrying the captured stderr, or
//! `"exit code N"` when the tool printed nothing. A missing executable is
//! `ToolError::Spawn`.
//!
//! # Example
//!
//! ```ignore
//! use fileforge_core::tool::{ProcessToolRunner, ToolInvocation, ToolRunner};
//! use tokio_util::sync::CancellationToken;
//!
//! let runner = ProcessToolRunner::new();
//! let invocation = ToolInvocation::new("7zz")
//!     .args(["a", "-tzip", "/out/report.zip", "*"])
//!     .current_dir("/out/report_tmp");
//!
//! runner.run(&invocation, &CancellationToken::new()).await?;
//! ```

mod error;
mod locate;
mod process;
mod traits;
mod types;

pub use error::ToolError;
pub use locate::{check_tools, locate, ToolStatus};
pub use process::ProcessToolRunner;
pub use traits::ToolRunner;
pub use types::ToolInvocation;

pub(crate) use types::program_name;
