// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `RealProcessBackend` built on `tokio::process::Command`. Tests swap in
//!   a fake backend that never spawns anything.
//! - [`runner`] owns the two runner variants (GUI / headless), output
//!   decoding, logging and the exit-code-to-outcome mapping.

pub mod backend;
pub mod runner;

pub use backend::{ProcessBackend, RealProcessBackend};
pub use runner::{decode_output, Console, ProcessRunner, ResourceTag, RunnerVariant};
