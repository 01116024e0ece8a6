//! Mock tool runner for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::tool::{ToolError, ToolInvocation, ToolRunner};

/// Simulates a tool: inspects the invocation, may write files, returns the
/// outcome.
pub type ToolHandler = Arc<dyn Fn(&ToolInvocation) -> Result<(), ToolError> + Send + Sync>;

/// Mock implementation of the ToolRunner trait.
///
/// Provides controllable behavior for testing:
/// - Records every invocation for assertions
/// - Runs an optional handler to simulate tool side effects
/// - Fails invocations whose arguments mention a given string
/// - Honors cancellation like the real runner
///
/// # Example
///
/// ```rust,ignore
/// use fileforge_core::testing::{fixtures::FakeTools, MockToolRunner};
///
/// let runner = MockToolRunner::with_handler(
///     FakeTools::new().with_archive("a.zip", &[("a.txt", "hello")]).handler(),
/// );
/// runner.fail_when_arg_contains("b.docx", "source file could not be loaded").await;
///
/// // ... run a batch ...
///
/// assert_eq!(runner.invocation_count().await, 3);
/// ```
#[derive(Clone)]
pub struct MockToolRunner {
    invocations: Arc<RwLock<Vec<ToolInvocation>>>,
    handler: Arc<RwLock<Option<ToolHandler>>>,
    failures: Arc<RwLock<Vec<(String, String)>>>,
}

impl Default for MockToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolRunner {
    /// Create a runner where every invocation succeeds without side effects.
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(RwLock::new(Vec::new())),
            handler: Arc::new(RwLock::new(None)),
            failures: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a runner that passes every invocation to `handler`.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&ToolInvocation) -> Result<(), ToolError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(RwLock::new(Some(Arc::new(handler)))),
            ..Self::new()
        }
    }

    /// Replace the handler.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&ToolInvocation) -> Result<(), ToolError> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Arc::new(handler));
    }

    /// Fail any invocation with an argument containing `needle`, reporting
    /// `stderr` as the tool's error output.
    pub async fn fail_when_arg_contains(&self, needle: impl Into<String>, stderr: impl Into<String>) {
        self.failures
            .write()
            .await
            .push((needle.into(), stderr.into()));
    }

    /// Get all recorded invocations, in call order.
    pub async fn recorded_invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.read().await.clone()
    }

    /// Get the number of invocations performed.
    pub async fn invocation_count(&self) -> usize {
        self.invocations.read().await.len()
    }

    /// Clear recorded invocations.
    pub async fn clear_recorded(&self) {
        self.invocations.write().await.clear();
    }
}

#[async_trait]
impl ToolRunner for MockToolRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        invocation: &ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled);
        }

        self.invocations.write().await.push(invocation.clone());

        for (needle, stderr) in self.failures.read().await.iter() {
            if invocation.args_lossy().iter().any(|a| a.contains(needle.as_str())) {
                return Err(ToolError::invocation_failed(
                    invocation.program.clone(),
                    1,
                    stderr,
                ));
            }
        }

        let handler = self.handler.read().await.clone();
        match handler {
            Some(handler) => handler(invocation),
            None => Ok(()),
        }
    }
}
