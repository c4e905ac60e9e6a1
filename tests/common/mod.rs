#![allow(dead_code)]

use std::time::Duration;

pub use blockdag_test_utils::{batches, id_vec, ids, init_tracing};

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
