// src/locate/fixed.rs

use std::path::PathBuf;

use super::LocatorStrategy;
use crate::errors::Result;

/// Locator backed by `[robot].path` in the config file.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    path: PathBuf,
}

impl ConfigLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocatorStrategy for ConfigLocator {
    fn name(&self) -> &'static str {
        "config"
    }

    fn locate(&self) -> Result<PathBuf> {
        Ok(self.path.clone())
    }
}
