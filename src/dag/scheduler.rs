// src/dag/scheduler.rs

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::dag::builder::{BuildOptions, BuildOutcome, GraphBuilder};
use crate::dag::graph::AdjacencyMap;
use crate::dag::planner::{plan, Batch, BatchPlan};
use crate::dag::readiness::ready;
use crate::errors::{FetchError, Result, SchedulerError};
use crate::lookup::DependencyLookup;
use crate::types::{LookupContext, TaskId};

/// Everything one planning call produced.
///
/// A report with fetch errors or a degenerate batch is still a complete
/// partition of the input, but should be reviewed by a human before anything
/// runs it in parallel; see [`PlanReport::needs_review`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    pub batches: Vec<Batch>,
    /// Lookups that failed; those tasks were planned as unblocked.
    pub errors: Vec<FetchError>,
    pub degenerate: bool,
    pub cycles: Vec<Vec<TaskId>>,
    /// The map the batches were computed from, for follow-up `ready_now`
    /// queries.
    pub adjacency: AdjacencyMap,
}

impl PlanReport {
    fn new(plan: BatchPlan, outcome: BuildOutcome) -> Self {
        Self {
            batches: plan.batches,
            errors: outcome.errors,
            degenerate: plan.degenerate,
            cycles: plan.cycles,
            adjacency: outcome.adjacency,
        }
    }

    pub fn needs_review(&self) -> bool {
        self.degenerate || !self.errors.is_empty()
    }

    /// Batches as plain id lists.
    pub fn task_ids(&self) -> Vec<Vec<TaskId>> {
        self.batches.iter().map(|b| b.tasks.clone()).collect()
    }

    pub fn batch_index_of(&self, task: TaskId) -> Option<usize> {
        self.batches.iter().position(|b| b.contains(task))
    }

    /// One-line explanation of why the plan needs review, if it does.
    pub fn review_reason(&self) -> Option<String> {
        match (self.degenerate, self.errors.len()) {
            (false, 0) => None,
            (true, 0) => Some(format!("dependency cycles among {:?}", self.cycles)),
            (false, n) => Some(format!("{n} dependency lookup(s) failed")),
            (true, n) => Some(format!(
                "dependency cycles among {:?} and {n} dependency lookup(s) failed",
                self.cycles
            )),
        }
    }
}

/// Entry point tying the graph builder and the planner together.
///
/// Holds no per-call state: every call builds a fresh adjacency map.
#[derive(Debug, Clone)]
pub struct Scheduler<L> {
    builder: GraphBuilder<L>,
}

impl<L: DependencyLookup + 'static> Scheduler<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            builder: GraphBuilder::new(lookup),
        }
    }

    pub fn with_options(self, options: BuildOptions) -> Self {
        Self {
            builder: self.builder.with_options(options),
        }
    }

    pub fn with_context(self, context: LookupContext) -> Self {
        Self {
            builder: self.builder.with_context(context),
        }
    }

    /// Fetch dependencies for `task_ids` and partition them into batches.
    ///
    /// Rejects an empty list or a list with duplicates. Everything else
    /// produces a report, degraded if lookups failed.
    pub async fn plan_batches(&self, task_ids: &[TaskId]) -> Result<PlanReport> {
        let task_set = validate_task_ids(task_ids)?;

        let outcome = self.builder.build(&task_set).await;
        let plan = plan(&task_set, &outcome.adjacency);
        let report = PlanReport::new(plan, outcome);

        info!(
            tasks = task_set.len(),
            batches = report.batches.len(),
            errors = report.errors.len(),
            degenerate = report.degenerate,
            "plan computed"
        );

        if let Some(reason) = report.review_reason() {
            warn!(%reason, "plan needs review before parallel execution");
        }

        Ok(report)
    }

    /// Fetch dependencies only; for callers that drive execution through
    /// [`ready_now`].
    pub async fn adjacency(&self, task_ids: &[TaskId]) -> Result<BuildOutcome> {
        let task_set = validate_task_ids(task_ids)?;
        Ok(self.builder.build(&task_set).await)
    }
}

/// Tasks of `adjacency` that may start given what the caller has completed.
pub fn ready_now(adjacency: &AdjacencyMap, completed: &BTreeSet<TaskId>) -> BTreeSet<TaskId> {
    ready(adjacency, completed)
}

fn validate_task_ids(task_ids: &[TaskId]) -> Result<BTreeSet<TaskId>> {
    if task_ids.is_empty() {
        return Err(SchedulerError::InvalidInput(
            "task id list must not be empty".to_string(),
        ));
    }

    let mut set = BTreeSet::new();
    for &task in task_ids {
        if !set.insert(task) {
            return Err(SchedulerError::InvalidInput(format!(
                "task id {task} appears more than once"
            )));
        }
    }

    Ok(set)
}
