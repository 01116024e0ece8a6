use chrono::Utc;
use tokio::sync::mpsc;

use super::types::{StatusEnvelope, StatusEvent};
use crate::capabilities::Domain;

/// Handle for emitting status events.
///
/// Cheap to clone. A closed or full channel never fails the batch; the
/// problem is logged and the event dropped.
#[derive(Clone, Debug)]
pub struct StatusSender {
    tx: mpsc::Sender<StatusEnvelope>,
}

/// Creates a bounded status channel.
pub fn create_status_channel(buffer: usize) -> (StatusSender, mpsc::Receiver<StatusEnvelope>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (StatusSender::new(tx), rx)
}

impl StatusSender {
    pub fn new(tx: mpsc::Sender<StatusEnvelope>) -> Self {
        Self { tx }
    }

    fn envelope(domain: Domain, event: StatusEvent) -> StatusEnvelope {
        StatusEnvelope {
            channel: domain.status_channel(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Emits an event, waiting for channel capacity.
    pub async fn emit(&self, domain: Domain, event: StatusEvent) {
        if let Err(e) = self.tx.send(Self::envelope(domain, event)).await {
            tracing::error!("Failed to emit status event: {}", e);
        }
    }
}
