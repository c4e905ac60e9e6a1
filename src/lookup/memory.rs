// src/lookup/memory.rs

use std::collections::BTreeMap;

use tracing::trace;

use crate::config::Manifest;
use crate::errors::LookupError;
use crate::lookup::{DependencyLookup, LookupFuture};
use crate::types::{DependencyEdge, LookupContext, TaskId};

/// Lookup over a fixed, fully known "blocked by" relation.
///
/// Tasks that were never registered fail with [`LookupError::NotFound`], the
/// same way a tracker answers for an issue number that does not exist.
/// The lookup context is ignored.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    blocked_by: BTreeMap<TaskId, Vec<TaskId>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` with the given blockers, replacing any previous entry.
    pub fn with_task(mut self, task: impl Into<TaskId>, blocked_by: &[u64]) -> Self {
        self.insert(task.into(), blocked_by.iter().copied().map(TaskId).collect());
        self
    }

    pub fn insert(&mut self, task: TaskId, blocked_by: Vec<TaskId>) {
        self.blocked_by.insert(task, blocked_by);
    }

    /// Build from raw edges; every endpoint becomes a known task.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut blocked_by: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
        for edge in edges {
            blocked_by.entry(edge.task).or_default().push(edge.blocking_task);
            blocked_by.entry(edge.blocking_task).or_default();
        }
        Self { blocked_by }
    }

    /// Build from a validated manifest's `[task.<id>]` sections.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let blocked_by = manifest
            .tasks
            .iter()
            .map(|(&id, entry)| (id, entry.blocked_by.clone()))
            .collect();
        Self { blocked_by }
    }

    pub fn known_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.blocked_by.keys().copied()
    }
}

impl DependencyLookup for StaticLookup {
    fn dependencies<'a>(&'a self, task: TaskId, _context: &'a LookupContext) -> LookupFuture<'a> {
        let result = match self.blocked_by.get(&task) {
            Some(deps) => Ok(deps.clone()),
            None => Err(LookupError::NotFound(task)),
        };
        trace!(task = %task, found = result.is_ok(), "static lookup");
        Box::pin(async move { result })
    }
}
