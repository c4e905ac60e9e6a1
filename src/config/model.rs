// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::dag::builder::{BuildOptions, DEFAULT_MAX_CONCURRENCY};
use crate::types::{LookupContext, TaskId};

/// Manifest as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// max_concurrency = 4
/// fetch_timeout_ms = 30000
/// scope = "acme/widgets"
///
/// [task.12]
/// title = "Parser rewrite"
/// blocked_by = [10, 11]
/// ```
///
/// Task keys are strings here because TOML table keys always are; they are
/// parsed into [`TaskId`]s during validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawManifest {
    /// Scheduler settings from `[config]`.
    #[serde(default)]
    pub config: SchedulerConfig,

    /// All tasks from `[task.<id>]`.
    #[serde(default)]
    pub task: BTreeMap<String, TaskEntry>,
}

/// `[config]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of dependency lookups in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Deadline for the whole fetch stage, in milliseconds.
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,

    /// Scope handed to the lookup (e.g. `owner/repo`).
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            fetch_timeout_ms: None,
            scope: None,
        }
    }
}

impl SchedulerConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_concurrency: self.max_concurrency,
            timeout: self.fetch_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn lookup_context(&self) -> LookupContext {
        LookupContext {
            scope: self.scope.clone(),
        }
    }
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct TaskEntry {
    /// Free-form label, only used in output.
    #[serde(default)]
    pub title: Option<String>,

    /// Tasks that must complete before this one. May name tasks that are not
    /// in the manifest.
    #[serde(default)]
    pub blocked_by: Vec<TaskId>,
}

/// A validated manifest.
///
/// Constructed only through `TryFrom<RawManifest>` (see `validate.rs`), so
/// holding one means the config is usable.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub config: SchedulerConfig,
    pub tasks: BTreeMap<TaskId, TaskEntry>,
}

impl Manifest {
    pub(crate) fn new_unchecked(
        config: SchedulerConfig,
        tasks: BTreeMap<TaskId, TaskEntry>,
    ) -> Self {
        Self { config, tasks }
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn title_of(&self, task: TaskId) -> Option<&str> {
        self.tasks.get(&task).and_then(|t| t.title.as_deref())
    }
}
