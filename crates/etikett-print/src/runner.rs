// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subprocess execution for the local print tools.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use etikett_core::EtikettError;
use etikett_core::error::Result;

use crate::command::Invocation;

/// Windows process creation flag that suppresses the console window.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an [`Invocation`] to completion.
///
/// Implementations must report a program that cannot be started as
/// [`EtikettError::ToolUnavailable`], so the readiness probe can fall back.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Spawns real processes with `tokio::process`.
///
/// Every run is bounded by a timeout; a child still running at the deadline
/// is killed and the run fails with [`EtikettError::Timeout`].
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// A `Command` that does not flash a console window on Windows.
fn hidden_command(program: &str) -> Command {
    #[allow(unused_mut)]
    let mut command = Command::new(program);
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);
    command
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        debug!(command = %invocation, "spawning");

        let mut command = hidden_command(invocation.program);
        command
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| EtikettError::ToolUnavailable {
                tool: invocation.tool().to_string(),
                detail: e.to_string(),
            })?;

        // Stdin is fed from its own task so a child that fills its output
        // pipes before reading cannot stall the write.
        let writer = match (invocation.stdin.clone(), child.stdin.take()) {
            (Some(data), Some(mut pipe)) => Some(tokio::spawn(async move {
                pipe.write_all(&data).await?;
                pipe.shutdown().await
            })),
            _ => None,
        };
        let work = async move {
            let output = child.wait_with_output().await?;
            if let Some(writer) = writer {
                match writer.await {
                    Ok(Ok(())) => {}
                    // The child exited without reading everything; its exit
                    // status and stderr say why.
                    Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                        debug!(error = %e, "child closed stdin early");
                    }
                    Ok(Err(e)) => return Err(e),
                    Err(e) => return Err(std::io::Error::other(e.to_string())),
                }
            }
            Ok(output)
        };

        // Dropping `work` on expiry drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| EtikettError::Timeout {
                operation: invocation.to_string(),
                secs: self.timeout.as_secs(),
            })??;

        let output = ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            command = %invocation,
            code = ?output.code,
            stdout_len = output.stdout.len(),
            "process finished"
        );
        Ok(output)
    }
}
