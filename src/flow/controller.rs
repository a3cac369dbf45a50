// src/flow/controller.rs

//! The runner flow as an explicit state machine.
//!
//! ```text
//! Start -> ParametersBound -> CommandBuilt -> RunningGui      -> Succeeded
//!                                         \-> RunningHeadless -> Failed
//! ```
//!
//! Any error at any step moves straight to `Failed`. Nothing is retried.

use std::fmt;
use std::sync::Arc;

use encoding_rs::Encoding;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::command::build_command;
use crate::errors::{PixError, Result};
use crate::exec::{ProcessBackend, ProcessRunner, RunnerVariant};
use crate::flow::request::InvocationRequest;
use crate::locate::LocatorStrategy;
use crate::types::{CommandLine, ExecutionResult};

/// States of a single flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    Start,
    ParametersBound,
    CommandBuilt,
    RunningGui,
    RunningHeadless,
    Succeeded,
    Failed,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Succeeded | FlowState::Failed)
    }

    fn running(variant: RunnerVariant) -> Self {
        match variant {
            RunnerVariant::Gui => FlowState::RunningGui,
            RunnerVariant::Headless => FlowState::RunningHeadless,
        }
    }
}

/// Record of one flow run: every state visited plus the final result.
#[derive(Debug)]
pub struct FlowRun {
    states: Vec<FlowState>,
    result: Result<ExecutionResult>,
}

impl FlowRun {
    fn new() -> Self {
        Self {
            states: vec![FlowState::Start],
            result: Err(PixError::ConfigError("flow run did not finish".to_string())),
        }
    }

    fn enter(&mut self, state: FlowState) {
        debug!(from = ?self.final_state(), to = ?state, "flow transition");
        self.states.push(state);
    }

    fn succeed(mut self, result: ExecutionResult) -> Self {
        self.enter(FlowState::Succeeded);
        self.result = Ok(result);
        self
    }

    fn fail(mut self, err: PixError) -> Self {
        error!(error = %err, "flow run failed");
        self.enter(FlowState::Failed);
        self.result = Err(err);
        self
    }

    /// All visited states, starting with `Start`.
    pub fn states(&self) -> &[FlowState] {
        &self.states
    }

    pub fn final_state(&self) -> FlowState {
        self.states.last().copied().unwrap_or(FlowState::Start)
    }

    pub fn succeeded(&self) -> bool {
        self.final_state() == FlowState::Succeeded
    }

    /// The runner variant that executed, if the run got that far.
    pub fn variant(&self) -> Option<RunnerVariant> {
        self.states.iter().find_map(|s| match s {
            FlowState::RunningGui => Some(RunnerVariant::Gui),
            FlowState::RunningHeadless => Some(RunnerVariant::Headless),
            _ => None,
        })
    }

    pub fn result(&self) -> &Result<ExecutionResult> {
        &self.result
    }

    pub fn into_result(self) -> Result<ExecutionResult> {
        self.result
    }
}

/// Wires the locator, command builder and both runner variants together.
#[derive(Clone)]
pub struct FlowController {
    locator: Arc<dyn LocatorStrategy>,
    gui: ProcessRunner,
    headless: ProcessRunner,
}

impl fmt::Debug for FlowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowController")
            .field("locator", &self.locator)
            .field("gui", &self.gui)
            .field("headless", &self.headless)
            .finish()
    }
}

impl FlowController {
    pub fn new(
        locator: Arc<dyn LocatorStrategy>,
        backend: Arc<dyn ProcessBackend>,
        encoding: &'static Encoding,
    ) -> Self {
        Self {
            locator,
            gui: ProcessRunner::new(RunnerVariant::Gui, Arc::clone(&backend), encoding),
            headless: ProcessRunner::new(RunnerVariant::Headless, backend, encoding),
        }
    }

    fn runner(&self, variant: RunnerVariant) -> &ProcessRunner {
        match variant {
            RunnerVariant::Gui => &self.gui,
            RunnerVariant::Headless => &self.headless,
        }
    }

    /// Run the flow from a raw parameter bundle, binding it first.
    pub async fn run_params(&self, params: &Map<String, Value>) -> FlowRun {
        let run = FlowRun::new();
        match InvocationRequest::from_params(params) {
            Ok(request) => self.run_bound(run, request).await,
            Err(err) => run.fail(err),
        }
    }

    /// Run the flow for an already bound request.
    pub async fn run(&self, request: InvocationRequest) -> FlowRun {
        self.run_bound(FlowRun::new(), request).await
    }

    /// Convenience wrapper returning only the result.
    pub async fn execute(&self, request: InvocationRequest) -> Result<ExecutionResult> {
        self.run(request).await.into_result()
    }

    /// Builds the command on the blocking pool; the registry locator waits
    /// on `reg.exe`.
    async fn build(&self, request: InvocationRequest) -> Result<CommandLine> {
        let locator = Arc::clone(&self.locator);
        tokio::task::spawn_blocking(move || {
            build_command(
                &request.script_path,
                request.script_parameters.as_ref(),
                request.robot_path.as_deref(),
                locator.as_ref(),
            )
        })
        .await
        .map_err(|e| PixError::Other(anyhow::anyhow!("command builder task failed: {e}")))?
    }

    async fn run_bound(&self, mut run: FlowRun, request: InvocationRequest) -> FlowRun {
        run.enter(FlowState::ParametersBound);
        info!(
            script_path = %request.script_path,
            need_gui = request.need_gui,
            robot_path = ?request.robot_path,
            "flow parameters bound"
        );

        let variant = RunnerVariant::for_gui(request.need_gui);
        let command = match self.build(request).await {
            Ok(cmd) => cmd,
            Err(err) => return run.fail(err),
        };
        run.enter(FlowState::CommandBuilt);

        run.enter(FlowState::running(variant));

        match self.runner(variant).run(&command).await {
            Ok(result) => {
                info!(exit_code = result.exit_code, %variant, "flow run succeeded");
                run.succeed(result)
            }
            Err(err) => run.fail(err),
        }
    }
}
