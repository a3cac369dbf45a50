// src/trigger/local.rs

//! In-process orchestrator.
//!
//! Runs each flow run as its own Tokio task on the current runtime. This is
//! what `pixrun trigger` uses; a distributed deployment plugs in its own
//! [`Orchestrator`] instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use super::{BoxFuture, FlowRunSpec, Orchestrator, RunId, TerminalState};
use crate::errors::{PixError, Result};
use crate::flow::{FlowController, FlowDefinition, FlowRun};

/// Internal handle for a run started by [`LocalOrchestrator`].
///
/// - `handle` is taken by the first waiter.
/// - `abort` stays behind so the run can still be cancelled while someone
///   is waiting on it.
struct LocalRun {
    run_name: String,
    handle: Option<JoinHandle<FlowRun>>,
    abort: AbortHandle,
}

pub struct LocalOrchestrator {
    definition: FlowDefinition,
    controller: FlowController,
    next_id: AtomicU64,
    runs: Mutex<HashMap<RunId, LocalRun>>,
}

impl std::fmt::Debug for LocalOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalOrchestrator")
            .field("flow", &self.definition.name)
            .field("project", &self.definition.project)
            .finish_non_exhaustive()
    }
}

impl LocalOrchestrator {
    pub fn new(definition: FlowDefinition, controller: FlowController) -> Self {
        Self {
            definition,
            controller,
            next_id: AtomicU64::new(1),
            runs: Mutex::new(HashMap::new()),
        }
    }

    /// Names of runs that have been started and not yet awaited.
    pub fn pending_runs(&self) -> Vec<String> {
        self.lock_runs()
            .values()
            .filter(|r| r.handle.is_some())
            .map(|r| r.run_name.clone())
            .collect()
    }

    fn lock_runs(&self) -> std::sync::MutexGuard<'_, HashMap<RunId, LocalRun>> {
        // A poisoned map only means another waiter panicked; the entries
        // themselves are still consistent.
        self.runs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start(&self, spec: FlowRunSpec) -> Result<RunId> {
        if spec.flow_name != self.definition.name || spec.project_name != self.definition.project {
            return Err(PixError::ConfigError(format!(
                "unknown flow '{}' in project '{}'",
                spec.flow_name, spec.project_name
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let controller = self.controller.clone();
        let params = spec.parameters;
        let run_name = spec.run_name;

        info!(run_id = id, run_name = %run_name, flow = %self.definition.name, "starting local flow run");

        let handle = tokio::spawn(async move { controller.run_params(&params).await });
        let abort = handle.abort_handle();

        self.lock_runs().insert(
            id,
            LocalRun {
                run_name,
                handle: Some(handle),
                abort,
            },
        );
        Ok(id)
    }

    fn take_handle(&self, id: RunId) -> Result<(String, JoinHandle<FlowRun>)> {
        let mut runs = self.lock_runs();
        let run = runs
            .get_mut(&id)
            .ok_or_else(|| PixError::ConfigError(format!("unknown run id {id}")))?;
        let handle = run
            .handle
            .take()
            .ok_or_else(|| PixError::ConfigError(format!("run {id} is already being awaited")))?;
        Ok((run.run_name.clone(), handle))
    }
}

impl Orchestrator for LocalOrchestrator {
    fn create_flow_run(&self, spec: FlowRunSpec) -> BoxFuture<'_, Result<RunId>> {
        let started = self.start(spec);
        Box::pin(async move { started })
    }

    fn wait_for_flow_run(&self, id: RunId) -> BoxFuture<'_, Result<TerminalState>> {
        Box::pin(async move {
            let (run_name, handle) = self.take_handle(id)?;

            let state = match handle.await {
                Ok(run) => match run.into_result() {
                    Ok(_) => TerminalState::Succeeded,
                    Err(err) => TerminalState::Failed(err.to_string()),
                },
                Err(join_err) if join_err.is_cancelled() => TerminalState::Cancelled,
                Err(join_err) => TerminalState::Failed(format!("run panicked: {join_err}")),
            };

            debug!(run_id = id, run_name = %run_name, ?state, "local flow run finished");
            self.lock_runs().remove(&id);
            Ok(state)
        })
    }

    fn cancel_flow_run(&self, id: RunId) -> BoxFuture<'_, Result<()>> {
        let cancelled = match self.lock_runs().remove(&id) {
            Some(run) => {
                info!(run_id = id, run_name = %run.run_name, "cancelling local flow run");
                run.abort.abort();
                Ok(())
            }
            None => Err(PixError::ConfigError(format!("unknown run id {id}"))),
        };
        Box::pin(async move { cancelled })
    }
}
