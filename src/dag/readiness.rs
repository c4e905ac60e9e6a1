// src/dag/readiness.rs

use std::collections::BTreeSet;

use crate::dag::graph::AdjacencyMap;
use crate::types::TaskId;

/// Tasks that may start right now.
///
/// Returns every task of `adjacency` that is not in `completed` and whose
/// dependencies are all in `completed`. Holds no state; callers grow
/// `completed` between calls as work finishes.
///
/// Whether a *failed* task belongs in `completed` is the caller's decision.
pub fn ready(adjacency: &AdjacencyMap, completed: &BTreeSet<TaskId>) -> BTreeSet<TaskId> {
    adjacency
        .tasks()
        .filter(|task| !completed.contains(task))
        .filter(|&task| {
            adjacency
                .dependencies_of(task)
                .iter()
                .all(|dep| completed.contains(dep))
        })
        .collect()
}
