//! Shared harness for vunat's integration tests: project and config
//! builders, a [`CaptureSink`] that records supervisor output, and guards for
//! tests that spawn real processes.

pub mod builders;
pub mod capture_sink;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

pub use capture_sink::CaptureSink;

/// Upper bound for a single supervisor run in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Route the supervisor's `tracing` events through the test writer, once per
/// test binary. Filtered by `RUST_LOG`, `info` when unset.
///
/// Process start/exit and shutdown events then show up next to a failing
/// test's assertion message.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, panicking after [`TEST_TIMEOUT`].
///
/// Scenarios start `sleep 30` style commands that only end when the
/// supervisor kills them; a teardown regression fails here instead of
/// hanging the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("supervisor run did not finish within {TEST_TIMEOUT:?}"))
}
