// src/dag/planner.rs

//! Cycle-safe batch planning.
//!
//! [`plan`] layers a task set Kahn-style: the first batch holds every task
//! without an in-set dependency, and each following batch holds the tasks
//! whose last outstanding dependency was in the batch before. An in-degree
//! counter per task keeps the whole pass at O(V + E).
//!
//! If tasks remain but none can make progress, the remainder is emitted as a
//! single *degenerate* batch and planning stops, so the result always covers
//! the full set. The strongly connected components responsible are reported
//! alongside.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::dag::graph::AdjacencyMap;
use crate::types::TaskId;

/// One layer of a plan: tasks that may run concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Members, ascending.
    pub tasks: Vec<TaskId>,
    /// Set on the final forced batch of a cyclic plan. Members of a degenerate
    /// batch carry no ordering guarantee relative to each other's
    /// dependencies.
    pub degenerate: bool,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.tasks.binary_search(&task).is_ok()
    }
}

/// Ordered batches covering a task set exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub batches: Vec<Batch>,
    /// True when the last batch was forced out because of a cycle.
    pub degenerate: bool,
    /// Cycles among the unresolved remainder (empty unless `degenerate`).
    /// Each cycle is sorted ascending; cycles are ordered by first member.
    pub cycles: Vec<Vec<TaskId>>,
}

impl BatchPlan {
    /// Batches as plain id lists.
    pub fn task_ids(&self) -> Vec<Vec<TaskId>> {
        self.batches.iter().map(|b| b.tasks.clone()).collect()
    }

    /// Index of the batch containing `task`, if any.
    pub fn batch_index_of(&self, task: TaskId) -> Option<usize> {
        self.batches.iter().position(|b| b.contains(task))
    }

    pub fn task_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }
}

/// Partition `task_ids` into ordered, parallel-safe batches.
///
/// Dependencies naming tasks outside `task_ids` are treated as satisfied.
/// Never fails; an empty input yields an empty plan.
pub fn plan(task_ids: &BTreeSet<TaskId>, adjacency: &AdjacencyMap) -> BatchPlan {
    let mut in_degree: BTreeMap<TaskId, usize> = task_ids
        .iter()
        .map(|&task| {
            let outstanding = adjacency
                .dependencies_of(task)
                .iter()
                .filter(|dep| task_ids.contains(dep))
                .count();
            (task, outstanding)
        })
        .collect();

    let mut ready: BTreeSet<TaskId> = in_degree
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(&task, _)| task)
        .collect();

    let mut batches: Vec<Batch> = Vec::new();
    let mut scheduled = 0usize;

    while !ready.is_empty() {
        let mut next: BTreeSet<TaskId> = BTreeSet::new();

        for &task in &ready {
            in_degree.remove(&task);
            for dependent in adjacency.dependents_of(task) {
                if let Some(deg) = in_degree.get_mut(dependent) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        next.insert(*dependent);
                    }
                }
            }
        }

        scheduled += ready.len();
        debug!(batch = batches.len(), size = ready.len(), "planned batch");
        batches.push(Batch {
            tasks: ready.into_iter().collect(),
            degenerate: false,
        });
        ready = next;
    }

    if scheduled == task_ids.len() {
        return BatchPlan {
            batches,
            degenerate: false,
            cycles: Vec::new(),
        };
    }

    // No progress possible: whatever is left is on or behind a cycle.
    let remaining: BTreeSet<TaskId> = in_degree.into_keys().collect();
    let cycles = find_cycles(&remaining, adjacency);

    warn!(
        remaining = remaining.len(),
        cycles = cycles.len(),
        "dependency cycle detected; forcing remaining tasks into one degenerate batch"
    );

    batches.push(Batch {
        tasks: remaining.into_iter().collect(),
        degenerate: true,
    });

    BatchPlan {
        batches,
        degenerate: true,
        cycles,
    }
}

/// Strongly connected components among `remaining` that form real cycles.
fn find_cycles(remaining: &BTreeSet<TaskId>, adjacency: &AdjacencyMap) -> Vec<Vec<TaskId>> {
    // Edge direction: dep -> task.
    let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();

    for &task in remaining {
        graph.add_node(task);
    }
    for &task in remaining {
        for &dep in adjacency.dependencies_of(task) {
            if remaining.contains(&dep) {
                graph.add_edge(dep, task, ());
            }
        }
    }

    let mut cycles: Vec<Vec<TaskId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&task| graph.contains_edge(task, task))
        })
        .map(|mut component| {
            component.sort_unstable();
            component
        })
        .collect();
    cycles.sort();
    cycles
}
