//! Per-item status events for running batches.
//!
//! Every batch item goes through `processing` and then exactly one of `done`
//! or `error`. Events are wrapped in a [`StatusEnvelope`] naming the domain
//! channel (`"<domain>:status"`) and pushed through a [`StatusSender`].
//! Whoever holds the receiving end (the server's WebSocket fan-out, a test)
//! decides what to do with them.

mod sender;
mod types;

pub use sender::{create_status_channel, StatusSender};
pub use types::{ItemStatus, StatusEnvelope, StatusEvent};
