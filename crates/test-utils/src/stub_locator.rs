use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pixrun::errors::{PixError, Result};
use pixrun::locate::LocatorStrategy;

/// Locator that returns a fixed answer and counts how often it was asked.
#[derive(Debug, Clone)]
pub struct StubLocator {
    answer: Option<PathBuf>,
    calls: Arc<AtomicUsize>,
}

impl StubLocator {
    pub fn found(path: impl Into<PathBuf>) -> Self {
        Self {
            answer: Some(path.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn missing() -> Self {
        Self {
            answer: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocatorStrategy for StubLocator {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn locate(&self) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or_else(|| {
            PixError::ExecutorNotFound("stub locator has no robot. Is PIX Robot installed?".into())
        })
    }
}
