// src/errors.rs

//! Crate-wide error types.
//!
//! - [`SchedulerError`] is what the public API returns when it refuses to
//!   produce a plan at all.
//! - [`LookupError`] is what a [`DependencyLookup`](crate::lookup::DependencyLookup)
//!   reports for a single task.
//! - [`FetchFailure`] / [`FetchError`] are the non-fatal records the graph
//!   builder accumulates while degrading fail-open.

use thiserror::Error;

use crate::types::TaskId;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Plan requires review: {0}")]
    ReviewRequired(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Failure reported by a dependency lookup backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Why the graph builder has no dependency data for a task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("lookup still outstanding when the fetch timeout fired")]
    TimedOut,

    #[error("lookup aborted: {0}")]
    Aborted(String),
}

/// A dependency lookup that failed for `task`.
///
/// The task was planned as if it had no dependencies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dependency lookup failed for task {task}: {reason}")]
pub struct FetchError {
    pub task: TaskId,
    pub reason: FetchFailure,
}

impl FetchError {
    pub fn new(task: TaskId, reason: impl Into<FetchFailure>) -> Self {
        Self {
            task,
            reason: reason.into(),
        }
    }
}
