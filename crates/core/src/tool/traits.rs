//! Trait definitions for the tool module.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::ToolError;
use super::types::ToolInvocation;

/// Runs external command-line tools.
///
/// Implementations resolve with `Ok(())` when the process exits with code 0.
/// Conversion steps only talk to tools through this trait, so tests can swap
/// in a runner that never spawns a real binary.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs one invocation to completion. A single call is a single attempt.
    async fn run(
        &self,
        invocation: &ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;
}
