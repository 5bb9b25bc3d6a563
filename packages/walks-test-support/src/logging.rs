//! Test logging shared by the backend's unit and integration tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Used when neither `TEST_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVES: &str = "warn";

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Pick the filter directives: `TEST_LOG` wins over `RUST_LOG`, and blank
/// values count as unset.
pub fn directives(test_log: Option<&str>, rust_log: Option<&str>) -> String {
    [test_log, rust_log]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES)
        .to_string()
}

/// Install a test-writer subscriber once per process. Never panics if a
/// subscriber is already installed.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let test_log = std::env::var("TEST_LOG").ok();
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = EnvFilter::try_new(directives(test_log.as_deref(), rust_log.as_deref()))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
