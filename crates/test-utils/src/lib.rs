pub mod builders;
pub mod fake_backend;
pub mod log_capture;
pub mod stub_locator;

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

pub use fake_backend::FakeBackend;
pub use log_capture::{capture_logs, LogCapture};
pub use stub_locator::StubLocator;

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: OnceLock<()> = OnceLock::new();

/// Install a global subscriber that writes through the test harness, so
/// output only shows up for failing tests. `RUST_LOG` overrides the
/// default `pixrun=debug` filter.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pixrun=debug"));
        // Another harness may already own the global slot.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `fut`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("step did not finish within {TEST_TIMEOUT:?}"),
    }
}
