// src/types.rs

//! Small value types shared by the lookup layer and the planner.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Opaque identifier of one schedulable unit of work.
///
/// In practice this is an issue number within a single repository, so it is
/// modelled as a `u64`. Ordering is numeric and is what makes batch output
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        TaskId(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#');
        trimmed
            .parse::<u64>()
            .map(TaskId)
            .map_err(|e| format!("invalid task id {s:?}: {e}"))
    }
}

/// Directed dependency: `task` cannot start until `blocking_task` is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyEdge {
    pub task: TaskId,
    pub blocking_task: TaskId,
}

impl DependencyEdge {
    pub fn new(task: impl Into<TaskId>, blocking_task: impl Into<TaskId>) -> Self {
        Self {
            task: task.into(),
            blocking_task: blocking_task.into(),
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.task, self.blocking_task)
    }
}

/// Scope passed through to every dependency lookup.
///
/// The scheduler never interprets it; a tracker-backed lookup would use it to
/// pick the repository the issue numbers belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LookupContext {
    pub scope: Option<String>,
}

impl LookupContext {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
        }
    }

    pub fn unscoped() -> Self {
        Self::default()
    }
}

impl fmt::Display for LookupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => f.write_str(scope),
            None => f.write_str("<unscoped>"),
        }
    }
}
