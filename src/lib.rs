// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod lookup;
pub mod types;

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::Manifest;
use crate::dag::builder::BuildOptions;
use crate::dag::{ready_now, PlanReport, Scheduler};
use crate::errors::{FetchError, Result, SchedulerError};
use crate::lookup::StaticLookup;
use crate::types::TaskId;

pub use crate::dag::plan;
pub use crate::errors::{FetchFailure, LookupError};
pub use crate::lookup::DependencyLookup;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading
/// - a manifest-backed dependency lookup
/// - the scheduler, in either planning or readiness mode
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest = load_and_validate(&args.manifest)?;
    let options = build_options(&manifest, &args)?;

    let scheduler = Scheduler::new(StaticLookup::from_manifest(&manifest))
        .with_options(options)
        .with_context(manifest.config.lookup_context());

    let task_ids = if args.tasks.is_empty() {
        manifest.task_ids()
    } else {
        args.tasks.clone()
    };
    info!(tasks = task_ids.len(), manifest = ?args.manifest, "planning tasks");

    if args.ready {
        let outcome = scheduler.adjacency(&task_ids).await?;
        let completed: BTreeSet<TaskId> = args.completed.iter().copied().collect();
        let now = ready_now(&outcome.adjacency, &completed);

        print!("{}", render_ready(&now, &outcome.errors));

        if args.strict && !outcome.errors.is_empty() {
            return Err(SchedulerError::ReviewRequired(format!(
                "{} dependency lookup(s) failed",
                outcome.errors.len()
            )));
        }
        return Ok(());
    }

    let report = scheduler.plan_batches(&task_ids).await?;
    print_plan(&manifest, &report);

    if args.strict {
        if let Some(reason) = report.review_reason() {
            return Err(SchedulerError::ReviewRequired(reason));
        }
    }

    Ok(())
}

/// Manifest `[config]` with CLI overrides applied.
fn build_options(manifest: &Manifest, args: &CliArgs) -> Result<BuildOptions> {
    let mut options = manifest.config.build_options();

    if let Some(n) = args.max_concurrency {
        if n == 0 {
            return Err(SchedulerError::ConfigError(
                "--max-concurrency must be >= 1 (got 0)".to_string(),
            ));
        }
        options.max_concurrency = n;
    }

    if let Some(ms) = args.timeout_ms {
        if ms == 0 {
            return Err(SchedulerError::ConfigError(
                "--timeout-ms must be >= 1 (got 0)".to_string(),
            ));
        }
        options.timeout = Some(std::time::Duration::from_millis(ms));
    }

    debug!(?options, "effective build options");
    Ok(options)
}

fn print_plan(manifest: &Manifest, report: &PlanReport) {
    for (index, batch) in report.batches.iter().enumerate() {
        for &task in &batch.tasks {
            if let Some(title) = manifest.title_of(task) {
                debug!(task = %task, batch = index + 1, %title, "planned task");
            }
        }
    }
    print!("{}", render_plan(report));
}

/// Text form of a plan: one `batch N:` line per batch, then `cycle:` and
/// `error:` lines.
pub fn render_plan(report: &PlanReport) -> String {
    let mut out = String::new();
    for (index, batch) in report.batches.iter().enumerate() {
        let marker = if batch.degenerate { " (degenerate)" } else { "" };
        out.push_str(&format!("batch {}{marker}: {}\n", index + 1, join_ids(&batch.tasks)));
    }
    for cycle in &report.cycles {
        out.push_str(&format!("cycle: {}\n", join_ids(cycle)));
    }
    out.push_str(&render_fetch_errors(&report.errors));
    out
}

/// Text form of a readiness query: a `ready:` line, then `error:` lines.
pub fn render_ready(ready: &BTreeSet<TaskId>, errors: &[FetchError]) -> String {
    let ids: Vec<TaskId> = ready.iter().copied().collect();
    let mut out = format!("ready: {}\n", join_ids(&ids));
    out.push_str(&render_fetch_errors(errors));
    out
}

fn render_fetch_errors(errors: &[FetchError]) -> String {
    errors.iter().map(|err| format!("error: {err}\n")).collect()
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
