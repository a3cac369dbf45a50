// src/trigger/mod.rs

//! Starting the runner flow from a parent flow.
//!
//! A parent starts exactly one named child run through an [`Orchestrator`]
//! and blocks until that run reaches a terminal state. A failed child fails
//! the parent; cancelling the parent cancels the child.

pub mod local;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::{PixError, Result};
use crate::flow::InvocationRequest;

pub use local::LocalOrchestrator;

/// Identifier of a run inside an orchestrator.
pub type RunId = u64;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Everything needed to start a remote flow run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRunSpec {
    pub flow_name: String,
    pub project_name: String,
    pub run_name: String,
    pub parameters: Map<String, Value>,
}

/// How a remote run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalState {
    Succeeded,
    Failed(String),
    Cancelled,
}

/// The orchestrator boundary: start a run, wait for it, cancel it.
pub trait Orchestrator: Send + Sync {
    fn create_flow_run(&self, spec: FlowRunSpec) -> BoxFuture<'_, Result<RunId>>;

    /// Block until the run is terminal. There is no timeout here.
    fn wait_for_flow_run(&self, id: RunId) -> BoxFuture<'_, Result<TerminalState>>;

    fn cancel_flow_run(&self, id: RunId) -> BoxFuture<'_, Result<()>>;
}

/// A child run that finished successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredRun {
    pub id: RunId,
    pub run_name: String,
}

/// Parent-side trigger for a named flow.
#[derive(Clone)]
pub struct CrossFlowTrigger {
    orchestrator: Arc<dyn Orchestrator>,
    flow_name: String,
    project_name: String,
}

impl fmt::Debug for CrossFlowTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossFlowTrigger")
            .field("flow_name", &self.flow_name)
            .field("project_name", &self.project_name)
            .finish_non_exhaustive()
    }
}

impl CrossFlowTrigger {
    pub fn new(
        orchestrator: Arc<dyn Orchestrator>,
        flow_name: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            flow_name: flow_name.into(),
            project_name: project_name.into(),
        }
    }

    /// Start one run and wait for it.
    pub async fn trigger(&self, run_name: &str, request: &InvocationRequest) -> Result<TriggeredRun> {
        self.trigger_until(run_name, request, std::future::pending::<()>())
            .await
    }

    /// Like [`trigger`](Self::trigger), but if `cancel` completes first the
    /// remote run is cancelled and [`PixError::Cancelled`] is returned.
    pub async fn trigger_until<C>(
        &self,
        run_name: &str,
        request: &InvocationRequest,
        cancel: C,
    ) -> Result<TriggeredRun>
    where
        C: Future<Output = ()> + Send,
    {
        let spec = FlowRunSpec {
            flow_name: self.flow_name.clone(),
            project_name: self.project_name.clone(),
            run_name: run_name.to_string(),
            parameters: request.to_params(),
        };

        let id = self.orchestrator.create_flow_run(spec).await?;
        info!(run_id = id, run_name, flow = %self.flow_name, "child flow run created");

        let state = tokio::select! {
            state = self.orchestrator.wait_for_flow_run(id) => state?,
            () = cancel => {
                warn!(run_id = id, run_name, "cancellation requested; cancelling child flow run");
                self.orchestrator.cancel_flow_run(id).await?;
                return Err(PixError::Cancelled(format!("run '{run_name}' cancelled by parent")));
            }
        };

        match state {
            TerminalState::Succeeded => {
                info!(run_id = id, run_name, "child flow run succeeded");
                Ok(TriggeredRun {
                    id,
                    run_name: run_name.to_string(),
                })
            }
            TerminalState::Failed(reason) => Err(PixError::RemoteRunFailed {
                run_name: run_name.to_string(),
                reason,
            }),
            TerminalState::Cancelled => Err(PixError::RemoteRunFailed {
                run_name: run_name.to_string(),
                reason: "run was cancelled".to_string(),
            }),
        }
    }
}
