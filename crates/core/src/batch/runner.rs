//! Sequential batch execution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::BatchError;
use super::types::{
    BatchOutput, BatchResult, ConversionRequest, FailedEntry, OutputEntry, CANCELLED_MESSAGE,
};
use crate::capabilities::Domain;
use crate::config::{Config, OutputConfig};
use crate::convert::{step_for, ConversionStep};
use crate::metrics::{BATCHES_TOTAL, BATCH_DURATION, ITEMS_TOTAL};
use crate::status::{ItemStatus, StatusEvent, StatusSender};
use crate::tool::ToolRunner;

/// Runs batches for one domain.
///
/// Items are converted strictly one after another. A failing item is recorded
/// and the batch moves on; only missing preconditions fail the whole batch.
pub struct BatchRunner {
    step: Arc<dyn ConversionStep>,
    status: StatusSender,
    output: OutputConfig,
}

impl BatchRunner {
    pub fn new(step: Arc<dyn ConversionStep>, status: StatusSender, output: OutputConfig) -> Self {
        Self {
            step,
            status,
            output,
        }
    }

    /// Builds a runner for `domain` with the step configured from `config`.
    pub fn for_domain(
        domain: Domain,
        runner: Arc<dyn ToolRunner>,
        config: &Config,
        status: StatusSender,
    ) -> Self {
        Self::new(step_for(domain, runner, config), status, config.output.clone())
    }

    pub fn domain(&self) -> Domain {
        self.step.domain()
    }

    /// `<output folder>/<domain subdirectory>`.
    pub fn output_dir(&self) -> Result<PathBuf, BatchError> {
        let folder = self
            .output
            .folder
            .as_ref()
            .ok_or_else(BatchError::missing_output_folder)?;
        Ok(folder.join(self.domain().output_subdir()))
    }

    /// Converts every request, emitting one `processing` and one terminal
    /// status event per item, in index order.
    pub async fn run_batch(
        &self,
        requests: &[ConversionRequest],
        cancel: &CancellationToken,
    ) -> Result<BatchResult, BatchError> {
        let domain = self.domain();

        let output_dir = match self.prepare(requests).await {
            Ok(dir) => dir,
            Err(e) => {
                BATCHES_TOTAL
                    .with_label_values(&[domain.as_str(), "rejected"])
                    .inc();
                warn!(domain = %domain, error = %e, "Batch rejected");
                return Err(e);
            }
        };

        let batch_id = Uuid::new_v4();
        info!(
            batch_id = %batch_id,
            domain = %domain,
            items = requests.len(),
            output = %output_dir.display(),
            "Starting batch"
        );
        let start = Instant::now();

        let mut statuses = vec![ItemStatus::Queued; requests.len()];
        let mut outputs = Vec::with_capacity(requests.len());

        for (index, request) in requests.iter().enumerate() {
            self.transition(&mut statuses, StatusEvent::processing(index))
                .await;

            let outcome = if cancel.is_cancelled() {
                Err((CANCELLED_MESSAGE.to_string(), true))
            } else {
                let target = request.resolved_target(domain);
                debug!(index, path = %request.path.display(), target = %target, "Converting item");
                self.step
                    .convert(&request.path, &target, &output_dir, cancel)
                    .await
                    .map_err(|e| (e.to_string(), e.is_cancelled()))
            };

            match outcome {
                Ok(path) => {
                    ITEMS_TOTAL
                        .with_label_values(&[domain.as_str(), "done"])
                        .inc();
                    info!(index, output = %path.display(), "Item converted");
                    self.transition(&mut statuses, StatusEvent::done(index))
                        .await;
                    outputs.push(BatchOutput::Converted(OutputEntry { path }));
                }
                Err((message, cancelled)) => {
                    let label = if cancelled { "cancelled" } else { "error" };
                    ITEMS_TOTAL
                        .with_label_values(&[domain.as_str(), label])
                        .inc();
                    warn!(index, path = %request.path.display(), error = %message, "Item failed");
                    self.transition(&mut statuses, StatusEvent::error(index, message.clone()))
                        .await;
                    outputs.push(BatchOutput::Failed(FailedEntry::new(
                        request.path.clone(),
                        message,
                    )));
                }
            }
        }

        let result = BatchResult::completed(outputs);
        let label = if result.has_failures() {
            "partial"
        } else {
            "completed"
        };
        BATCHES_TOTAL
            .with_label_values(&[domain.as_str(), label])
            .inc();
        BATCH_DURATION
            .with_label_values(&[domain.as_str()])
            .observe(start.elapsed().as_secs_f64());

        info!(
            batch_id = %batch_id,
            domain = %domain,
            items = requests.len(),
            failed = result.failed_entries().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch finished"
        );

        Ok(result)
    }

    /// Entry point for callers that want a result in every case.
    ///
    /// Batch-level errors become `BatchResult { success: false, .. }`.
    pub async fn convert_files(
        &self,
        requests: &[ConversionRequest],
        cancel: &CancellationToken,
    ) -> BatchResult {
        match self.run_batch(requests, cancel).await {
            Ok(result) => result,
            Err(e) => BatchResult::rejected(e.to_string()),
        }
    }

    async fn prepare(&self, requests: &[ConversionRequest]) -> Result<PathBuf, BatchError> {
        if requests.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let output_dir = self.output_dir()?;
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| BatchError::OutputDirectory {
                path: output_dir.clone(),
                source,
            })?;

        Ok(output_dir)
    }

    async fn transition(&self, statuses: &mut [ItemStatus], event: StatusEvent) {
        let current = statuses[event.index];
        if !current.can_transition_to(event.status) {
            error!(
                index = event.index,
                from = current.as_str(),
                to = event.status.as_str(),
                "Illegal item status transition"
            );
            return;
        }

        statuses[event.index] = event.status;
        self.status.emit(self.domain(), event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConvertError;
    use crate::tool::ToolError;
    use crate::status::{create_status_channel, StatusEnvelope};
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    /// Step that succeeds unless the file name contains "bad".
    struct NameStep;

    #[async_trait]
    impl ConversionStep for NameStep {
        fn domain(&self) -> Domain {
            Domain::Image
        }

        async fn convert(
            &self,
            input: &Path,
            target: &str,
            output_dir: &Path,
            _cancel: &CancellationToken,
        ) -> Result<PathBuf, ConvertError> {
            if input.to_string_lossy().contains("bad") {
                return Err(ConvertError::input_not_found(input));
            }
            let stem = input.file_stem().unwrap().to_string_lossy();
            Ok(output_dir.join(format!("{}.{}", stem, target)))
        }
    }

    /// Step that cancels the batch from inside its first conversion.
    struct CancellingStep {
        token: CancellationToken,
    }

    #[async_trait]
    impl ConversionStep for CancellingStep {
        fn domain(&self) -> Domain {
            Domain::Document
        }

        async fn convert(
            &self,
            _input: &Path,
            _target: &str,
            _output_dir: &Path,
            _cancel: &CancellationToken,
        ) -> Result<PathBuf, ConvertError> {
            self.token.cancel();
            Err(ConvertError::Tool(ToolError::Cancelled))
        }
    }

    fn runner(folder: Option<PathBuf>) -> (BatchRunner, mpsc::Receiver<StatusEnvelope>) {
        let (status, rx) = create_status_channel(64);
        let runner = BatchRunner::new(Arc::new(NameStep), status, OutputConfig { folder });
        (runner, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<StatusEnvelope>) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            assert_eq!(envelope.channel, "image:status");
            events.push(envelope.event);
        }
        events
    }

    #[tokio::test]
    async fn test_events_in_index_order() {
        let dir = TempDir::new().unwrap();
        let (runner, mut rx) = runner(Some(dir.path().to_path_buf()));

        let requests = vec![
            ConversionRequest::new("/in/a.jpg", "png"),
            ConversionRequest::new("/in/bad.jpg", "png"),
            ConversionRequest::with_default_target("/in/c.gif"),
        ];
        let result = runner
            .run_batch(&requests, &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.outputs.len(), 3);
        assert_eq!(
            result.message.as_deref(),
            Some("1 of 3 files could not be converted.")
        );
        assert_eq!(
            result.outputs[2],
            BatchOutput::Converted(OutputEntry {
                path: dir.path().join("images").join("c.png")
            })
        );

        let events = drain(&mut rx);
        let statuses: Vec<(usize, ItemStatus)> =
            events.iter().map(|e| (e.index, e.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (0, ItemStatus::Processing),
                (0, ItemStatus::Done),
                (1, ItemStatus::Processing),
                (1, ItemStatus::Error),
                (2, ItemStatus::Processing),
                (2, ItemStatus::Done),
            ]
        );
        assert!(events[3].message.as_deref().unwrap().contains("bad.jpg"));
        assert!(dir.path().join("images").is_dir());
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let dir = TempDir::new().unwrap();
        let (runner, mut rx) = runner(Some(dir.path().to_path_buf()));

        let err = runner
            .run_batch(&[], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::EmptyBatch));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_missing_output_folder() {
        let (runner, mut rx) = runner(None);

        let result = runner
            .convert_files(
                &[ConversionRequest::new("/in/a.jpg", "png")],
                &CancellationToken::new(),
            )
            .await;

        assert!(!result.success);
        assert!(result.outputs.is_empty());
        assert_eq!(
            result.message.as_deref(),
            Some("No output folder defined in setup.")
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_batch_fails_remaining_items() {
        let dir = TempDir::new().unwrap();
        let (runner, mut rx) = runner(Some(dir.path().to_path_buf()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let requests = vec![
            ConversionRequest::new("/in/a.jpg", "png"),
            ConversionRequest::new("/in/b.jpg", "png"),
        ];
        let result = runner.run_batch(&requests, &cancel).await.unwrap();

        assert!(result.success);
        assert!(result
            .failed_entries()
            .all(|entry| entry.message == CANCELLED_MESSAGE));
        assert_eq!(result.failed_entries().count(), 2);
        assert_eq!(drain(&mut rx).len(), 4);
    }

    #[tokio::test]
    async fn test_cancelled_items_counted_separately() {
        let dir = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let (status, mut rx) = create_status_channel(64);
        let runner = BatchRunner::new(
            Arc::new(CancellingStep {
                token: cancel.clone(),
            }),
            status,
            OutputConfig {
                folder: Some(dir.path().to_path_buf()),
            },
        );

        let cancelled = ITEMS_TOTAL.with_label_values(&["document", "cancelled"]);
        let errors = ITEMS_TOTAL.with_label_values(&["document", "error"]);
        let (cancelled_before, errors_before) = (cancelled.get(), errors.get());

        let requests = vec![
            ConversionRequest::new("/in/a.docx", "pdf"),
            ConversionRequest::new("/in/b.docx", "pdf"),
        ];
        let result = runner.run_batch(&requests, &cancel).await.unwrap();

        assert_eq!(result.failed_entries().count(), 2);
        assert!(result
            .failed_entries()
            .all(|entry| entry.message == CANCELLED_MESSAGE));
        assert_eq!(cancelled.get() - cancelled_before, 2);
        assert_eq!(errors.get(), errors_before);
        assert_eq!(drain_any(&mut rx), 4);
    }

    fn drain_any(rx: &mut mpsc::Receiver<StatusEnvelope>) -> usize {
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}
