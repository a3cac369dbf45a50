use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pixrun::errors::Result;
use pixrun::exec::ProcessBackend;
use pixrun::types::{CommandLine, RawOutput};

/// A fake process backend that:
/// - records every command it was asked to run
/// - answers with scripted outputs (in order), or exit 0 once they run out
/// - optionally sleeps first, to simulate a long-running robot.
#[derive(Clone, Default)]
pub struct FakeBackend {
    executed: Arc<Mutex<Vec<CommandLine>>>,
    outputs: Arc<Mutex<VecDeque<RawOutput>>>,
    delay: Option<Duration>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose next run exits with `exit_code` and the given stderr.
    pub fn exiting(exit_code: i32, stderr: &str) -> Self {
        let backend = Self::new();
        backend.push_output(RawOutput {
            exit_code,
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        });
        backend
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_output(&self, output: RawOutput) {
        self.outputs.lock().unwrap().push_back(output);
    }

    /// Commands executed so far, oldest first.
    pub fn executed(&self) -> Vec<CommandLine> {
        self.executed.lock().unwrap().clone()
    }
}

impl ProcessBackend for FakeBackend {
    fn execute<'a>(
        &'a self,
        command: &'a CommandLine,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.executed.lock().unwrap().push(command.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let next = self.outputs.lock().unwrap().pop_front();
            Ok(next.unwrap_or_default())
        })
    }
}
