// src/dag/mod.rs

//! Dependency graph construction and scheduling.
//!
//! - [`graph`] holds the task-set-restricted [`AdjacencyMap`].
//! - [`builder`] fetches dependencies concurrently and fail-open.
//! - [`planner`] partitions a task set into ordered batches, even on cycles.
//! - [`readiness`] answers "what can start now?" for online execution.
//! - [`scheduler`] exposes `plan_batches` and `ready_now`.

pub mod builder;
pub mod graph;
pub mod planner;
pub mod readiness;
pub mod scheduler;

pub use builder::{BuildOptions, BuildOutcome, GraphBuilder};
pub use graph::AdjacencyMap;
pub use planner::{plan, Batch, BatchPlan};
pub use readiness::ready;
pub use scheduler::{ready_now, PlanReport, Scheduler};
