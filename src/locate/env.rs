// src/locate/env.rs

use std::path::PathBuf;

use tracing::debug;

use super::{not_found, LocatorStrategy};
use crate::errors::Result;

/// Locator backed by an environment variable holding the executor path.
#[derive(Debug, Clone)]
pub struct EnvLocator {
    var: String,
}

impl EnvLocator {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl LocatorStrategy for EnvLocator {
    fn name(&self) -> &'static str {
        "env"
    }

    fn locate(&self) -> Result<PathBuf> {
        match std::env::var_os(&self.var) {
            Some(value) if !value.is_empty() => {
                debug!(var = %self.var, "robot path taken from environment");
                Ok(PathBuf::from(value))
            }
            _ => Err(not_found(format_args!(
                "environment variable '{}' is not set",
                self.var
            ))),
        }
    }
}
