// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The runners talk to a `ProcessBackend` instead of spawning processes
//! directly. Production code uses [`RealProcessBackend`]; tests can provide
//! their own implementation that records commands and returns canned
//! output.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{PixError, Result};
use crate::types::{CommandLine, RawOutput};

/// Trait abstracting how a command line is executed.
pub trait ProcessBackend: Send + Sync {
    /// Run `command` to completion and return its full, undecoded output.
    fn execute<'a>(
        &'a self,
        command: &'a CommandLine,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutput>> + Send + 'a>>;
}

/// Real backend: spawns the executor as a child process and waits for it.
///
/// The child is killed if the waiting future is dropped, so cancelling a
/// run never leaves an orphaned robot behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProcessBackend;

impl RealProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for RealProcessBackend {
    fn execute<'a>(
        &'a self,
        command: &'a CommandLine,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutput>> + Send + 'a>> {
        Box::pin(async move {
            debug!(program = command.program(), args = ?command.args(), "spawning child process");

            let output = Command::new(command.program())
                .args(command.args())
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|source| PixError::SpawnFailed {
                    program: command.program().to_string(),
                    source,
                })?;

            Ok(RawOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        })
    }
}
