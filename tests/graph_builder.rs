// tests/graph_builder.rs

mod common;
use crate::common::{ids, init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use blockdag::dag::{BuildOptions, GraphBuilder};
use blockdag::errors::{FetchError, FetchFailure, LookupError};
use blockdag::lookup::{CachedLookup, StaticLookup};
use blockdag::types::{DependencyEdge, LookupContext, TaskId};
use blockdag_test_utils::fake_lookup::{
    ContextRecordingLookup, FlakyLookup, GaugedLookup, SlowLookup,
};

fn chain_lookup() -> StaticLookup {
    StaticLookup::new()
        .with_task(1, &[])
        .with_task(2, &[1])
        .with_task(3, &[2, 99])
}

#[tokio::test]
async fn builds_adjacency_restricted_to_the_requested_set() {
    init_tracing();

    let builder = GraphBuilder::new(chain_lookup());
    let outcome = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.adjacency.len(), 3);
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(2)), &ids(&[1]));
    // 99 is not being planned.
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(3)), &ids(&[2]));
    assert_eq!(outcome.adjacency.dependents_of(TaskId(1)), &ids(&[2]));
}

#[tokio::test]
async fn subset_build_drops_edges_to_unrequested_tasks() {
    let builder = GraphBuilder::new(chain_lookup());
    let outcome = with_timeout(builder.build(&ids(&[2, 3]))).await;

    assert!(outcome.adjacency.dependencies_of(TaskId(2)).is_empty());
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(3)), &ids(&[2]));
    assert!(!outcome.adjacency.contains(TaskId(1)));
}

#[tokio::test]
async fn failed_lookup_is_recorded_and_fails_open() {
    init_tracing();

    let lookup = FlakyLookup::new(chain_lookup()).failing(3);
    let builder = GraphBuilder::new(lookup);
    let outcome = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    assert_eq!(outcome.errors.len(), 1);
    let err = &outcome.errors[0];
    assert_eq!(err.task, TaskId(3));
    assert!(matches!(err.reason, FetchFailure::Lookup(LookupError::Backend(_))));

    // Task 3 is known to the map but with no dependencies.
    assert!(outcome.adjacency.contains(TaskId(3)));
    assert!(outcome.adjacency.dependencies_of(TaskId(3)).is_empty());
    // Other tasks are unaffected.
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(2)), &ids(&[1]));
}

#[tokio::test]
async fn unknown_task_surfaces_not_found() {
    let builder = GraphBuilder::new(chain_lookup());
    let outcome = with_timeout(builder.build(&ids(&[1, 404]))).await;

    assert_eq!(
        outcome.errors,
        vec![FetchError::new(
            TaskId(404),
            LookupError::NotFound(TaskId(404))
        )]
    );
    assert!(outcome.adjacency.contains(TaskId(404)));
}

#[tokio::test]
async fn panicking_lookup_is_recorded_as_aborted() {
    let lookup = FlakyLookup::new(chain_lookup()).panicking(2);
    let builder = GraphBuilder::new(lookup);
    let outcome = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].task, TaskId(2));
    assert!(matches!(outcome.errors[0].reason, FetchFailure::Aborted(_)));
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(3)), &ids(&[2]));
}

#[tokio::test]
async fn outstanding_lookups_time_out_without_blocking_the_build() {
    init_tracing();

    let lookup = SlowLookup::new(chain_lookup()).stall(2);
    let builder = GraphBuilder::new(lookup).with_options(BuildOptions {
        max_concurrency: 4,
        timeout: Some(Duration::from_millis(100)),
    });

    let outcome = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    assert_eq!(
        outcome.errors,
        vec![FetchError::new(TaskId(2), FetchFailure::TimedOut)]
    );
    assert!(outcome.adjacency.dependencies_of(TaskId(2)).is_empty());
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(3)), &ids(&[2]));
}

#[tokio::test]
async fn lookups_within_the_deadline_are_kept() {
    let lookup = SlowLookup::new(chain_lookup()).delay(3, Duration::from_millis(10));
    let builder = GraphBuilder::new(lookup).with_options(BuildOptions {
        max_concurrency: 2,
        timeout: Some(Duration::from_secs(2)),
    });

    let outcome = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(3)), &ids(&[2]));
}

#[tokio::test]
async fn concurrency_is_bounded_by_the_limit() {
    let mut lookup = StaticLookup::new();
    for task in 1..=20u64 {
        lookup.insert(TaskId(task), Vec::new());
    }
    let gauged = Arc::new(GaugedLookup::new(lookup, Duration::from_millis(20)));

    let builder = GraphBuilder::from_shared(Arc::clone(&gauged)).with_options(BuildOptions {
        max_concurrency: 3,
        timeout: None,
    });
    let task_ids = (1..=20u64).map(TaskId).collect();
    let outcome = with_timeout(builder.build(&task_ids)).await;

    assert!(outcome.errors.is_empty());
    assert_eq!(gauged.calls(), 20);
    assert_eq!(gauged.peak_in_flight(), 3);
}

#[tokio::test]
async fn zero_concurrency_is_treated_as_one() {
    let gauged = Arc::new(GaugedLookup::new(chain_lookup(), Duration::from_millis(5)));
    let builder = GraphBuilder::from_shared(Arc::clone(&gauged)).with_options(BuildOptions {
        max_concurrency: 0,
        timeout: None,
    });

    let outcome = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    assert!(outcome.errors.is_empty());
    assert_eq!(gauged.peak_in_flight(), 1);
}

#[tokio::test]
async fn context_is_passed_to_every_lookup() {
    let recorder = Arc::new(ContextRecordingLookup::new(chain_lookup()));
    let builder = GraphBuilder::from_shared(Arc::clone(&recorder))
        .with_context(LookupContext::new("acme/widgets"));

    with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    let seen = recorder.seen();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|c| c.scope.as_deref() == Some("acme/widgets")));
}

#[tokio::test]
async fn cached_lookup_serves_repeat_builds_from_memory() {
    let gauged = GaugedLookup::new(chain_lookup(), Duration::ZERO);
    let cached = Arc::new(CachedLookup::new(gauged));
    let builder = GraphBuilder::from_shared(Arc::clone(&cached));

    let first = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;
    let second = with_timeout(builder.build(&ids(&[1, 2, 3]))).await;

    assert_eq!(first, second);
    assert_eq!(cached.inner().calls(), 3);
    assert_eq!(cached.len(), 3);

    cached.invalidate(TaskId(2), builder.context());
    with_timeout(builder.build(&ids(&[1, 2, 3]))).await;
    assert_eq!(cached.inner().calls(), 4);
}

#[tokio::test]
async fn cached_lookup_does_not_cache_failures() {
    let flaky = FlakyLookup::new(chain_lookup()).failing(2);
    let cached = Arc::new(CachedLookup::new(flaky));
    let builder = GraphBuilder::from_shared(Arc::clone(&cached));

    let outcome = with_timeout(builder.build(&ids(&[1, 2]))).await;

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(cached.len(), 1);
}

#[tokio::test]
async fn cache_entries_are_scoped() {
    let gauged = GaugedLookup::new(chain_lookup(), Duration::ZERO);
    let cached = Arc::new(CachedLookup::new(gauged));

    let a = GraphBuilder::from_shared(Arc::clone(&cached)).with_context(LookupContext::new("a"));
    let b = GraphBuilder::from_shared(Arc::clone(&cached)).with_context(LookupContext::new("b"));

    with_timeout(a.build(&ids(&[1]))).await;
    with_timeout(b.build(&ids(&[1]))).await;

    assert_eq!(cached.inner().calls(), 2);
    assert_eq!(cached.len(), 2);
}

#[tokio::test]
async fn edge_backed_lookup_knows_every_endpoint() {
    let lookup = StaticLookup::from_edges([
        DependencyEdge::new(2u64, 1u64),
        DependencyEdge::new(3u64, 1u64),
        DependencyEdge::new(3u64, 2u64),
    ]);
    assert_eq!(lookup.known_tasks().collect::<Vec<_>>(), vec![TaskId(1), TaskId(2), TaskId(3)]);

    let outcome = with_timeout(GraphBuilder::new(lookup).build(&ids(&[1, 2, 3]))).await;

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.adjacency.dependencies_of(TaskId(3)), &ids(&[1, 2]));
    assert_eq!(outcome.adjacency.edge_count(), 3);
}
