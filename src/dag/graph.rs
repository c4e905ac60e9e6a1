// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{DependencyEdge, TaskId};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DagNode {
    /// Direct dependencies: tasks that must complete before this one can start.
    deps: BTreeSet<TaskId>,
    /// Direct dependents: tasks that are blocked by this one.
    dependents: BTreeSet<TaskId>,
}

/// Dependency relation restricted to one task set.
///
/// Every task of the set is a key, and every dependency is itself a member of
/// the set: edges that leave the set are dropped on construction, since this
/// planning run has no control over them and treats them as satisfied.
///
/// There is no way to mutate a map once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyMap {
    nodes: BTreeMap<TaskId, DagNode>,
}

impl AdjacencyMap {
    /// Build a map over `tasks` from raw `(task, blocking_task)` edges.
    ///
    /// Edges whose either end is outside `tasks` are pruned.
    pub fn from_edges<I>(tasks: &BTreeSet<TaskId>, edges: I) -> Self
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut nodes: BTreeMap<TaskId, DagNode> = tasks
            .iter()
            .map(|&task| (task, DagNode::default()))
            .collect();

        for edge in edges {
            if !tasks.contains(&edge.task) || !tasks.contains(&edge.blocking_task) {
                continue;
            }
            if let Some(node) = nodes.get_mut(&edge.task) {
                node.deps.insert(edge.blocking_task);
            }
            if let Some(node) = nodes.get_mut(&edge.blocking_task) {
                node.dependents.insert(edge.task);
            }
        }

        Self { nodes }
    }

    /// Build a map over `tasks` from per-task dependency lists.
    ///
    /// Lists for tasks outside `tasks` are ignored; tasks without a list get
    /// an empty dependency set.
    pub fn from_dependency_lists<I, D>(tasks: &BTreeSet<TaskId>, lists: I) -> Self
    where
        I: IntoIterator<Item = (TaskId, D)>,
        D: IntoIterator<Item = TaskId>,
    {
        let edges = lists.into_iter().flat_map(|(task, deps)| {
            deps.into_iter()
                .map(move |dep| DependencyEdge::new(task, dep))
        });
        Self::from_edges(tasks, edges)
    }

    /// All tasks, ascending.
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.nodes.contains_key(&task)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immediate dependencies of a task (empty for unknown tasks).
    pub fn dependencies_of(&self, task: TaskId) -> &BTreeSet<TaskId> {
        self.nodes
            .get(&task)
            .map(|n| &n.deps)
            .unwrap_or(empty_set())
    }

    /// Immediate dependents of a task (empty for unknown tasks).
    pub fn dependents_of(&self, task: TaskId) -> &BTreeSet<TaskId> {
        self.nodes
            .get(&task)
            .map(|n| &n.dependents)
            .unwrap_or(empty_set())
    }

    /// Every edge, ordered by task then blocking task.
    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.nodes.iter().flat_map(|(&task, node)| {
            node.deps
                .iter()
                .map(move |&dep| DependencyEdge::new(task, dep))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.deps.len()).sum()
    }
}

fn empty_set() -> &'static BTreeSet<TaskId> {
    static EMPTY: BTreeSet<TaskId> = BTreeSet::new();
    &EMPTY
}
