#![allow(dead_code)]

use std::collections::BTreeSet;

use blockdag::config::{Manifest, RawManifest, TaskEntry};
use blockdag::dag::AdjacencyMap;
use blockdag::types::{DependencyEdge, TaskId};

/// Builder for `AdjacencyMap` to simplify test setup.
///
/// Tasks referenced only as blockers are *not* added to the set, so edges to
/// them are pruned like any external dependency.
#[derive(Debug, Default)]
pub struct AdjacencyBuilder {
    tasks: BTreeSet<TaskId>,
    edges: Vec<DependencyEdge>,
}

impl AdjacencyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(mut self, tasks: &[u64]) -> Self {
        self.tasks.extend(tasks.iter().copied().map(TaskId));
        self
    }

    /// `task` is blocked by each of `deps`. Adds `task` to the set.
    pub fn blocked_by(mut self, task: u64, deps: &[u64]) -> Self {
        self.tasks.insert(TaskId(task));
        self.edges
            .extend(deps.iter().map(|&dep| DependencyEdge::new(task, dep)));
        self
    }

    pub fn task_set(&self) -> BTreeSet<TaskId> {
        self.tasks.clone()
    }

    pub fn build(self) -> AdjacencyMap {
        AdjacencyMap::from_edges(&self.tasks, self.edges)
    }

    pub fn build_with_tasks(self) -> (BTreeSet<TaskId>, AdjacencyMap) {
        let tasks = self.tasks.clone();
        (tasks, self.build())
    }
}

/// Builder for `Manifest`.
pub struct ManifestBuilder {
    raw: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawManifest::default(),
        }
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.raw.config.max_concurrency = n;
        self
    }

    pub fn fetch_timeout_ms(mut self, ms: u64) -> Self {
        self.raw.config.fetch_timeout_ms = Some(ms);
        self
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.raw.config.scope = Some(scope.to_string());
        self
    }

    pub fn with_task(mut self, id: u64, blocked_by: &[u64]) -> Self {
        self.raw.task.insert(
            id.to_string(),
            TaskEntry {
                title: None,
                blocked_by: blocked_by.iter().copied().map(TaskId).collect(),
            },
        );
        self
    }

    pub fn raw(self) -> RawManifest {
        self.raw
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.raw).expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
