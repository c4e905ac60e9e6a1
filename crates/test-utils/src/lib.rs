pub mod builders;
pub mod fake_lookup;

use std::collections::BTreeSet;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use blockdag::types::TaskId;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Shorthand for a set of task ids.
pub fn ids(raw: &[u64]) -> BTreeSet<TaskId> {
    raw.iter().copied().map(TaskId).collect()
}

/// Shorthand for a list of task ids, order preserved.
pub fn id_vec(raw: &[u64]) -> Vec<TaskId> {
    raw.iter().copied().map(TaskId).collect()
}

/// Shorthand for expected batches.
pub fn batches(raw: &[&[u64]]) -> Vec<Vec<TaskId>> {
    raw.iter().map(|b| id_vec(b)).collect()
}
