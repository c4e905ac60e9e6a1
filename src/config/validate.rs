// src/config/validate.rs

use std::collections::BTreeMap;

use crate::config::model::{Manifest, RawManifest, SchedulerConfig, TaskEntry};
use crate::errors::{Result, SchedulerError};
use crate::types::TaskId;

impl TryFrom<RawManifest> for Manifest {
    type Error = SchedulerError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        ensure_has_tasks(&raw)?;
        validate_scheduler_config(&raw.config)?;
        let tasks = parse_task_ids(raw.task)?;
        Ok(Manifest::new_unchecked(raw.config, tasks))
    }
}

/// Validate a raw manifest without consuming it.
pub fn validate_manifest(raw: &RawManifest) -> Result<()> {
    ensure_has_tasks(raw)?;
    validate_scheduler_config(&raw.config)?;
    parse_task_ids(raw.task.clone())?;
    Ok(())
}

fn ensure_has_tasks(raw: &RawManifest) -> Result<()> {
    if raw.task.is_empty() {
        return Err(SchedulerError::ConfigError(
            "manifest must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler_config(cfg: &SchedulerConfig) -> Result<()> {
    if cfg.max_concurrency == 0 {
        return Err(SchedulerError::ConfigError(
            "[config].max_concurrency must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.fetch_timeout_ms == Some(0) {
        return Err(SchedulerError::ConfigError(
            "[config].fetch_timeout_ms must be >= 1 when set (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn parse_task_ids(raw: BTreeMap<String, TaskEntry>) -> Result<BTreeMap<TaskId, TaskEntry>> {
    let mut tasks = BTreeMap::new();

    for (key, entry) in raw {
        let id: TaskId = key
            .parse()
            .map_err(|e: String| SchedulerError::ConfigError(format!("[task.{key}]: {e}")))?;

        // "7" and "#7" parse to the same id.
        if tasks.insert(id, entry).is_some() {
            return Err(SchedulerError::ConfigError(format!(
                "task {id} is declared more than once"
            )));
        }
    }

    Ok(tasks)
}
