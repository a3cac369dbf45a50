// src/errors.rs

//! Crate-wide error type.
//!
//! Every failure is surfaced to the caller (ultimately the orchestrator);
//! nothing in this crate retries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixError {
    /// The robot executable could not be resolved and none was supplied.
    #[error("Robot executable not found: {0}")]
    ExecutorNotFound(String),

    /// Malformed or missing required request / config fields.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// `script_parameters` of an unsupported type.
    #[error("Invalid script parameters: {0}")]
    InvalidParameter(String),

    /// The child process returned a non-zero exit code.
    #[error("process exited with exit_code={exit_code}: {stderr}")]
    ProcessExecution { exit_code: i32, stderr: String },

    /// The child process could not be started at all.
    #[error("failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A cross-flow triggered run finished in a failed terminal state.
    #[error("remote run '{run_name}' failed: {reason}")]
    RemoteRunFailed { run_name: String, reason: String },

    /// The wait was cancelled before the run reached a terminal state.
    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixError {
    /// Exit code of the failed child process, if this error carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PixError::ProcessExecution { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Captured stderr of the failed child process, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            PixError::ProcessExecution { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PixError>;
