// src/dag/builder.rs

//! Concurrent, fail-open construction of an [`AdjacencyMap`].
//!
//! Every requested task gets its own Tokio task in a `JoinSet`; a semaphore
//! caps how many lookups are in flight against the backend at once. Each
//! fetch hands back its own result, and results are only merged into the map
//! once every fetch has settled (or the fetch deadline has passed).
//!
//! Failures never abort the build. A task whose lookup failed, panicked or
//! timed out is recorded as a [`FetchError`] and planned as if it had no
//! dependencies.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::dag::graph::AdjacencyMap;
use crate::errors::{FetchError, FetchFailure, LookupError};
use crate::lookup::DependencyLookup;
use crate::types::{LookupContext, TaskId};

/// Default cap on concurrent lookups.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Knobs for the fetch stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum number of lookups in flight at once. Values below 1 are
    /// treated as 1.
    pub max_concurrency: usize,
    /// Deadline for the whole fetch stage. `None` waits for every lookup.
    pub timeout: Option<Duration>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
        }
    }
}

/// Result of one build: the (possibly degraded) map plus every fetch failure,
/// ordered by task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub adjacency: AdjacencyMap,
    pub errors: Vec<FetchError>,
}

type FetchSlot = (TaskId, std::result::Result<Vec<TaskId>, LookupError>);

/// Fetches dependencies for a task set and restricts them to that set.
#[derive(Debug)]
pub struct GraphBuilder<L> {
    lookup: Arc<L>,
    context: Arc<LookupContext>,
    options: BuildOptions,
}

impl<L> Clone for GraphBuilder<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            context: Arc::clone(&self.context),
            options: self.options,
        }
    }
}

impl<L: DependencyLookup + 'static> GraphBuilder<L> {
    pub fn new(lookup: L) -> Self {
        Self::from_shared(Arc::new(lookup))
    }

    /// Use a lookup that the caller keeps a handle to (e.g. a shared cache).
    pub fn from_shared(lookup: Arc<L>) -> Self {
        Self {
            lookup,
            context: Arc::new(LookupContext::default()),
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_context(mut self, context: LookupContext) -> Self {
        self.context = Arc::new(context);
        self
    }

    pub fn context(&self) -> &LookupContext {
        &self.context
    }

    /// Fetch dependencies for every task in `task_ids`.
    pub async fn build(&self, task_ids: &BTreeSet<TaskId>) -> BuildOutcome {
        let permits = self.options.max_concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(permits));
        let deadline = self.options.timeout.map(|t| Instant::now() + t);

        debug!(
            tasks = task_ids.len(),
            max_concurrency = permits,
            timeout = ?self.options.timeout,
            scope = %self.context,
            "graph builder: fetching dependencies"
        );

        let mut fetches: JoinSet<FetchSlot> = JoinSet::new();
        // Tokio task id -> task, so panics and timeouts can be attributed.
        let mut in_flight: HashMap<tokio::task::Id, TaskId> = HashMap::new();

        for &task in task_ids {
            let lookup = Arc::clone(&self.lookup);
            let context = Arc::clone(&self.context);
            let semaphore = Arc::clone(&semaphore);

            let handle = fetches.spawn(async move {
                // The semaphore is never closed, so acquisition only fails if
                // that changes; proceed without a permit in that case.
                let _permit = semaphore.acquire_owned().await.ok();
                debug!(task = %task, "fetching dependencies");
                let result = lookup.dependencies(task, &context).await;
                (task, result)
            });
            in_flight.insert(handle.id(), task);
        }

        let mut slots: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
        let mut errors: Vec<FetchError> = Vec::new();

        loop {
            let joined = match deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, fetches.join_next_with_id()).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            warn!(
                                outstanding = in_flight.len(),
                                "fetch timeout fired; aborting outstanding lookups"
                            );
                            fetches.abort_all();
                            break;
                        }
                    }
                }
                None => fetches.join_next_with_id().await,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((id, (task, Ok(deps)))) => {
                    in_flight.remove(&id);
                    debug!(task = %task, deps = deps.len(), "dependencies fetched");
                    slots.insert(task, deps);
                }
                Ok((id, (task, Err(err)))) => {
                    in_flight.remove(&id);
                    warn!(task = %task, error = %err, "dependency lookup failed; treating task as unblocked");
                    errors.push(FetchError::new(task, err));
                }
                Err(join_err) => {
                    if let Some(task) = in_flight.remove(&join_err.id()) {
                        warn!(task = %task, error = %join_err, "dependency lookup aborted; treating task as unblocked");
                        errors.push(FetchError::new(task, FetchFailure::Aborted(join_err.to_string())));
                    }
                }
            }
        }

        // Anything left never reported back before the deadline.
        for task in in_flight.into_values() {
            warn!(task = %task, "dependency lookup timed out; treating task as unblocked");
            errors.push(FetchError::new(task, FetchFailure::TimedOut));
        }
        errors.sort_by_key(|e| e.task);

        let adjacency = AdjacencyMap::from_dependency_lists(task_ids, slots);

        info!(
            tasks = adjacency.len(),
            edges = adjacency.edge_count(),
            errors = errors.len(),
            "graph builder: adjacency map built"
        );

        BuildOutcome { adjacency, errors }
    }
}
