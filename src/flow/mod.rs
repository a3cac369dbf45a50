// src/flow/mod.rs

//! The robot runner flow.
//!
//! - [`request`] binds loosely-typed flow parameters into an
//!   `InvocationRequest`.
//! - [`controller`] is the state machine that builds the command and
//!   dispatches it to the GUI or headless runner.
//! - [`definition`] describes the flow (inputs, tasks, resource tags) for an
//!   orchestrator.

pub mod controller;
pub mod definition;
pub mod request;

pub use controller::{FlowController, FlowRun, FlowState};
pub use definition::{
    runner_run_name, starter_run_name, FlowDefinition, ParameterSpec, TaskSpec,
};
pub use request::InvocationRequest;
