//! Tool runner backed by real child processes.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::ToolError;
use super::traits::ToolRunner;
use super::types::ToolInvocation;
use crate::metrics::{TOOL_DURATION, TOOL_INVOCATIONS};

/// Runs tools with `tokio::process`, capturing stderr for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolRunner {
    timeout: Option<Duration>,
}

/// How a spawned process stopped.
enum Outcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut,
}

impl ProcessToolRunner {
    /// Creates a runner without a timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner that kills processes after `timeout_secs`.
    /// A value of 0 disables the timeout.
    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        Self {
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }

    fn command(invocation: &ToolInvocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }

    async fn wait_timeout(timeout: Option<Duration>) {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[async_trait]
impl ToolRunner for ProcessToolRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(
        &self,
        invocation: &ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        let program = invocation.program_name();

        if cancel.is_cancelled() {
            TOOL_INVOCATIONS
                .with_label_values(&[&program, "cancelled"])
                .inc();
            return Err(ToolError::Cancelled);
        }

        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args_lossy(),
            cwd = ?invocation.working_dir,
            "Spawning tool"
        );

        let start = Instant::now();

        let mut child = Self::command(invocation).spawn().map_err(|e| {
            TOOL_INVOCATIONS
                .with_label_values(&[&program, "spawn_error"])
                .inc();
            warn!(program = %invocation.program.display(), error = %e, "Failed to start tool");
            ToolError::Spawn {
                program: invocation.program.clone(),
                source: e,
            }
        })?;

        // Drain stderr concurrently so a chatty tool never blocks on a full pipe.
        let stderr_pipe = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf).await;
            }
            String::from_utf8_lossy(&buf).to_string()
        });

        let outcome = tokio::select! {
            status = child.wait() => Outcome::Exited(status),
            _ = cancel.cancelled() => Outcome::Cancelled,
            _ = Self::wait_timeout(self.timeout) => Outcome::TimedOut,
        };

        let elapsed = start.elapsed();
        TOOL_DURATION
            .with_label_values(&[&program])
            .observe(elapsed.as_secs_f64());

        match outcome {
            Outcome::Exited(Ok(status)) => {
                let stderr = stderr_task.await.unwrap_or_default();

                if status.success() {
                    TOOL_INVOCATIONS
                        .with_label_values(&[&program, "success"])
                        .inc();
                    info!(
                        program = %program,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Tool finished"
                    );
                    Ok(())
                } else {
                    let code = status.code().unwrap_or(-1);
                    TOOL_INVOCATIONS
                        .with_label_values(&[&program, "failed"])
                        .inc();
                    warn!(
                        program = %program,
                        code = code,
                        elapsed_ms = elapsed.as_millis() as u64,
                        stderr = %stderr.chars().take(500).collect::<String>(),
                        "Tool failed"
                    );
                    Err(ToolError::invocation_failed(
                        invocation.program.clone(),
                        code,
                        &stderr,
                    ))
                }
            }
            Outcome::Exited(Err(e)) => {
                stderr_task.abort();
                TOOL_INVOCATIONS
                    .with_label_values(&[&program, "failed"])
                    .inc();
                Err(ToolError::Spawn {
                    program: invocation.program.clone(),
                    source: e,
                })
            }
            Outcome::Cancelled => {
                info!(program = %program, "Cancelled, killing tool process");
                let _ = child.kill().await;
                stderr_task.abort();
                TOOL_INVOCATIONS
                    .with_label_values(&[&program, "cancelled"])
                    .inc();
                Err(ToolError::Cancelled)
            }
            Outcome::TimedOut => {
                let timeout_secs = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
                warn!(program = %program, timeout_secs, "Tool timed out, killing");
                let _ = child.kill().await;
                stderr_task.abort();
                TOOL_INVOCATIONS
                    .with_label_values(&[&program, "timeout"])
                    .inc();
                Err(ToolError::Timeout {
                    program: invocation.program.clone(),
                    timeout_secs,
                })
            }
        }
    }
}
