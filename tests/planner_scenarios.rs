// tests/planner_scenarios.rs

mod common;
use crate::common::{batches, ids, init_tracing};

use blockdag::dag::{plan, AdjacencyMap};
use blockdag::types::TaskId;
use blockdag_test_utils::builders::AdjacencyBuilder;

#[test]
fn linear_chain_plans_one_task_per_batch() {
    init_tracing();

    // 2 -> 1, 3 -> 2
    let (tasks, adj) = AdjacencyBuilder::new()
        .with_tasks(&[1, 2, 3])
        .blocked_by(2, &[1])
        .blocked_by(3, &[2])
        .build_with_tasks();

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[1], &[2], &[3]]));
    assert!(!plan.degenerate);
    assert!(plan.cycles.is_empty());
    assert!(plan.batches.iter().all(|b| !b.degenerate));
}

#[test]
fn independent_tasks_share_a_single_batch() {
    let (tasks, adj) = AdjacencyBuilder::new()
        .with_tasks(&[12, 10, 11])
        .build_with_tasks();

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[10, 11, 12]]));
    assert!(!plan.degenerate);
}

#[test]
fn two_cycle_is_forced_into_one_degenerate_batch() {
    init_tracing();

    let (tasks, adj) = AdjacencyBuilder::new()
        .blocked_by(1, &[2])
        .blocked_by(2, &[1])
        .build_with_tasks();

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[1, 2]]));
    assert!(plan.degenerate);
    assert!(plan.batches[0].degenerate);
    assert_eq!(plan.cycles, batches(&[&[1, 2]]));
}

#[test]
fn dependency_outside_the_set_is_pruned() {
    // 6 -> 5, 7 -> 99 (99 is not being planned)
    let (tasks, adj) = AdjacencyBuilder::new()
        .with_tasks(&[5, 6, 7])
        .blocked_by(6, &[5])
        .blocked_by(7, &[99])
        .build_with_tasks();

    assert!(adj.dependencies_of(TaskId(7)).is_empty());
    assert!(!adj.contains(TaskId(99)));

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[5, 7], &[6]]));
    assert!(!plan.degenerate);
}

#[test]
fn diamond_runs_the_middle_layer_in_parallel() {
    //   1
    //  / \
    // 2   3
    //  \ /
    //   4
    let (tasks, adj) = AdjacencyBuilder::new()
        .blocked_by(1, &[])
        .blocked_by(2, &[1])
        .blocked_by(3, &[1])
        .blocked_by(4, &[2, 3])
        .build_with_tasks();

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[1], &[2, 3], &[4]]));
}

#[test]
fn tasks_downstream_of_a_cycle_land_in_the_degenerate_batch() {
    // 1 is free; 2 <-> 3 cycle; 4 waits on 3; 5 waits on 1.
    let (tasks, adj) = AdjacencyBuilder::new()
        .blocked_by(1, &[])
        .blocked_by(2, &[3])
        .blocked_by(3, &[2])
        .blocked_by(4, &[3])
        .blocked_by(5, &[1])
        .build_with_tasks();

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[1], &[5], &[2, 3, 4]]));
    assert!(plan.degenerate);
    assert!(!plan.batches[0].degenerate);
    assert!(plan.batches[2].degenerate);
    // 4 is stuck behind the cycle but is not part of it.
    assert_eq!(plan.cycles, batches(&[&[2, 3]]));
}

#[test]
fn self_dependency_is_reported_as_a_cycle() {
    let (tasks, adj) = AdjacencyBuilder::new()
        .blocked_by(1, &[])
        .blocked_by(2, &[2])
        .build_with_tasks();

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[1], &[2]]));
    assert!(plan.degenerate);
    assert_eq!(plan.cycles, batches(&[&[2]]));
}

#[test]
fn several_disjoint_cycles_are_all_reported() {
    let (tasks, adj) = AdjacencyBuilder::new()
        .blocked_by(10, &[11])
        .blocked_by(11, &[10])
        .blocked_by(1, &[3])
        .blocked_by(2, &[1])
        .blocked_by(3, &[2])
        .build_with_tasks();

    let plan = plan(&tasks, &adj);

    assert_eq!(plan.task_ids(), batches(&[&[1, 2, 3, 10, 11]]));
    assert_eq!(plan.cycles, batches(&[&[1, 2, 3], &[10, 11]]));
}

#[test]
fn planner_ignores_adjacency_entries_for_unplanned_tasks() {
    // The map covers 1..=3, but only {2, 3} are planned; 2's dependency on 1
    // counts as satisfied.
    let adj = AdjacencyBuilder::new()
        .blocked_by(1, &[])
        .blocked_by(2, &[1])
        .blocked_by(3, &[2])
        .build();

    let plan = plan(&ids(&[2, 3]), &adj);

    assert_eq!(plan.task_ids(), batches(&[&[2], &[3]]));
}

#[test]
fn empty_input_yields_an_empty_plan() {
    let plan = plan(&ids(&[]), &AdjacencyMap::default());

    assert!(plan.batches.is_empty());
    assert!(!plan.degenerate);
    assert_eq!(plan.task_count(), 0);
}

#[test]
fn repeated_planning_is_identical() {
    let (tasks, adj) = AdjacencyBuilder::new()
        .blocked_by(8, &[3, 5])
        .blocked_by(3, &[1])
        .blocked_by(5, &[1])
        .blocked_by(1, &[])
        .blocked_by(2, &[])
        .blocked_by(9, &[9])
        .build_with_tasks();

    let first = plan(&tasks, &adj);
    for _ in 0..10 {
        assert_eq!(plan(&tasks, &adj), first);
    }
    assert_eq!(first.batch_index_of(TaskId(8)), Some(2));
    assert_eq!(first.batch_index_of(TaskId(42)), None);
}
