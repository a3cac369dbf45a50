// src/exec/runner.rs

//! The two robot runner variants.
//!
//! Both run the command to completion, decode the captured output with the
//! configured codepage, log it, and map the exit code onto success or
//! [`PixError::ProcessExecution`]. They differ only in:
//! - the resource tags they request from the orchestrator, and
//! - whether stdout is echoed to the console.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use encoding_rs::Encoding;
use tracing::{error, info, warn};

use crate::errors::{PixError, Result};
use crate::exec::backend::ProcessBackend;
use crate::types::{CommandLine, ExecutionResult};

const RESOURCE_PREFIX: &str = "dask-resource:";

/// A scheduling resource a task consumes while it runs, e.g. one slot of
/// the exclusive `gui` resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceTag {
    pub resource: String,
    pub amount: u32,
}

impl ResourceTag {
    pub fn new(resource: impl Into<String>, amount: u32) -> Self {
        Self {
            resource: resource.into(),
            amount,
        }
    }
}

impl fmt::Display for ResourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RESOURCE_PREFIX}{}={}", self.resource, self.amount)
    }
}

impl FromStr for ResourceTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let body = s
            .strip_prefix(RESOURCE_PREFIX)
            .ok_or_else(|| format!("resource tag must start with '{RESOURCE_PREFIX}': {s}"))?;
        let (resource, amount) = body
            .split_once('=')
            .ok_or_else(|| format!("resource tag must look like name=amount: {s}"))?;
        if resource.is_empty() {
            return Err(format!("resource tag has an empty name: {s}"));
        }
        let amount = amount
            .parse::<u32>()
            .map_err(|e| format!("invalid amount in resource tag {s}: {e}"))?;
        Ok(ResourceTag::new(resource, amount))
    }
}

/// Which runner executes the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerVariant {
    /// The robot's GUI is surfaced; only one such session per worker.
    Gui,
    /// No GUI; may run alongside other robots.
    Headless,
}

impl RunnerVariant {
    /// Pick the variant for a coerced `need_gui` flag.
    pub fn for_gui(need_gui: bool) -> Self {
        if need_gui {
            RunnerVariant::Gui
        } else {
            RunnerVariant::Headless
        }
    }

    /// Orchestrator task name of this variant.
    pub fn task_name(&self) -> &'static str {
        match self {
            RunnerVariant::Gui => "run_cmd_w_gui",
            RunnerVariant::Headless => "run_cmd",
        }
    }

    /// Resource tags requested from the scheduler.
    pub fn resource_tags(&self) -> Vec<ResourceTag> {
        match self {
            RunnerVariant::Gui => vec![ResourceTag::new("pix", 1), ResourceTag::new("gui", 1)],
            RunnerVariant::Headless => vec![ResourceTag::new("pix", 1)],
        }
    }

    /// Whether child stdout is echoed to the console as well as logged.
    pub fn echoes_stdout(&self) -> bool {
        matches!(self, RunnerVariant::Gui)
    }
}

impl fmt::Display for RunnerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerVariant::Gui => f.write_str("gui"),
            RunnerVariant::Headless => f.write_str("headless"),
        }
    }
}

/// Decode child output with a legacy codepage. Malformed sequences become
/// U+FFFD instead of failing the run.
pub fn decode_output(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "child output contained undecodable bytes");
    }
    text.into_owned()
}

/// Where the GUI runner echoes robot stdout. Defaults to this process's
/// stdout.
pub type Console = Arc<Mutex<dyn Write + Send>>;

/// Runs a command line through a [`ProcessBackend`] as one runner variant.
#[derive(Clone)]
pub struct ProcessRunner {
    variant: RunnerVariant,
    backend: Arc<dyn ProcessBackend>,
    encoding: &'static Encoding,
    console: Console,
}

impl fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("variant", &self.variant)
            .field("encoding", &self.encoding.name())
            .finish_non_exhaustive()
    }
}

impl ProcessRunner {
    pub fn new(
        variant: RunnerVariant,
        backend: Arc<dyn ProcessBackend>,
        encoding: &'static Encoding,
    ) -> Self {
        Self {
            variant,
            backend,
            encoding,
            console: Arc::new(Mutex::new(std::io::stdout())),
        }
    }

    /// Echo to `console` instead of stdout.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn variant(&self) -> RunnerVariant {
        self.variant
    }

    /// Execute the command once. Non-zero exits are errors; there is no
    /// retry here.
    pub async fn run(&self, command: &CommandLine) -> Result<ExecutionResult> {
        info!(variant = %self.variant, cmd = %command, "run");

        let raw = self.backend.execute(command).await?;

        let result = ExecutionResult {
            exit_code: raw.exit_code,
            stdout: decode_output(&raw.stdout, self.encoding),
            stderr: decode_output(&raw.stderr, self.encoding),
        };

        info!(variant = %self.variant, stdout = %result.stdout, "robot stdout");
        if !result.stderr.is_empty() {
            error!(variant = %self.variant, stderr = %result.stderr, "robot stderr");
        }

        if self.variant.echoes_stdout() {
            self.echo(&result.stdout);
        }

        if result.exit_code != 0 {
            error!(variant = %self.variant, exit_code = result.exit_code, "robot process failed");
            return Err(PixError::ProcessExecution {
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        info!(variant = %self.variant, exit_code = result.exit_code, "robot process finished");
        Ok(result)
    }

    // A console that went away must not change the run outcome.
    fn echo(&self, text: &str) {
        let mut console = self
            .console
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let written = console
            .write_all(text.as_bytes())
            .and_then(|()| console.flush());
        if let Err(e) = written {
            warn!(variant = %self.variant, error = %e, "failed to echo robot stdout");
        }
    }
}
