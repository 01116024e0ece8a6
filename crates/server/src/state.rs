use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use fileforge_core::{BatchRunner, Config, Domain, SanitizedConfig, StatusSender, ToolRunner};

use crate::api::StatusBroadcaster;

/// Per-domain batch bookkeeping.
#[derive(Default)]
struct DomainSlot {
    /// Held for the whole duration of a batch.
    running: Mutex<()>,
    /// Token of the batch currently running, if any.
    cancel: std::sync::Mutex<Option<CancellationToken>>,
}

/// Shared application state
pub struct AppState {
    config: Config,
    runner: Arc<dyn ToolRunner>,
    status: StatusSender,
    broadcaster: StatusBroadcaster,
    slots: HashMap<Domain, DomainSlot>,
}

impl AppState {
    pub fn new(
        config: Config,
        runner: Arc<dyn ToolRunner>,
        status: StatusSender,
        broadcaster: StatusBroadcaster,
    ) -> Self {
        Self {
            config,
            runner,
            status,
            broadcaster,
            slots: Domain::ALL
                .into_iter()
                .map(|domain| (domain, DomainSlot::default()))
                .collect(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn broadcaster(&self) -> &StatusBroadcaster {
        &self.broadcaster
    }

    /// Builds a batch runner for `domain` sharing the process-wide tool
    /// runner and status channel.
    pub fn batch_runner(&self, domain: Domain) -> BatchRunner {
        BatchRunner::for_domain(
            domain,
            Arc::clone(&self.runner),
            &self.config,
            self.status.clone(),
        )
    }

    fn slot(&self, domain: Domain) -> &DomainSlot {
        // Every domain gets a slot in `new`.
        &self.slots[&domain]
    }

    /// Waits until no other batch of `domain` is running and registers a
    /// fresh cancellation token for the caller's batch.
    ///
    /// The returned guard releases the domain and clears the token on drop.
    pub async fn begin_batch(&self, domain: Domain) -> BatchGuard<'_> {
        let slot = self.slot(domain);
        let running = slot.running.lock().await;

        let token = CancellationToken::new();
        *lock_token(&slot.cancel) = Some(token.clone());

        BatchGuard {
            slot,
            token,
            _running: running,
        }
    }

    /// Cancels the running batch of `domain`.
    ///
    /// Returns false if no batch was running.
    pub fn cancel_batch(&self, domain: Domain) -> bool {
        match lock_token(&self.slot(domain).cancel).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

fn lock_token(
    cancel: &std::sync::Mutex<Option<CancellationToken>>,
) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
    cancel
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Exclusive access to one domain for one batch.
pub struct BatchGuard<'a> {
    slot: &'a DomainSlot,
    token: CancellationToken,
    _running: tokio::sync::MutexGuard<'a, ()>,
}

impl BatchGuard<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        lock_token(&self.slot.cancel).take();
    }
}
