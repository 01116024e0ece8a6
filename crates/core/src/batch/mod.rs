//! Batch conversion.
//!
//! A batch is an ordered list of [`ConversionRequest`]s for one domain. The
//! [`BatchRunner`] validates preconditions, converts items one at a time,
//! reports each item's progress through the status channel and collects a
//! [`BatchResult`] with one entry per request.

mod error;
mod runner;
mod types;

pub use error::BatchError;
pub use runner::BatchRunner;
pub use types::{
    BatchOutput, BatchResult, ConversionRequest, FailedEntry, OutputEntry, CANCELLED_MESSAGE,
};
