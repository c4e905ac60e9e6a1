// src/lookup/cache.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::lookup::{DependencyLookup, LookupFuture};
use crate::types::{LookupContext, TaskId};

type CacheKey = (Option<String>, TaskId);

/// Memoising wrapper around another lookup.
///
/// Only successful answers are cached, keyed by `(scope, task)`. The cache is
/// an ordinary value owned by whoever builds the graph builder; nothing is
/// shared process-wide.
///
/// Two concurrent misses for the same key both reach the inner lookup; the
/// later answer wins.
#[derive(Debug, Default)]
pub struct CachedLookup<L> {
    inner: L,
    entries: Mutex<HashMap<CacheKey, Vec<TaskId>>>,
}

impl<L: DependencyLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Number of cached answers.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the cached answer for a task in the given scope.
    pub fn invalidate(&self, task: TaskId, context: &LookupContext) {
        if self.entries().remove(&(context.scope.clone(), task)).is_some() {
            debug!(task = %task, scope = %context, "invalidated cached dependencies");
        }
    }

    // Every entry is written whole, so a poisoned map is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Vec<TaskId>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("dependency cache lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn cached(&self, key: &CacheKey) -> Option<Vec<TaskId>> {
        self.entries().get(key).cloned()
    }

    fn store(&self, key: CacheKey, deps: Vec<TaskId>) {
        self.entries().insert(key, deps);
    }
}

impl<L: DependencyLookup> DependencyLookup for CachedLookup<L> {
    fn dependencies<'a>(&'a self, task: TaskId, context: &'a LookupContext) -> LookupFuture<'a> {
        Box::pin(async move {
            let key = (context.scope.clone(), task);
            if let Some(deps) = self.cached(&key) {
                debug!(task = %task, "cache hit: dependencies served from cache");
                return Ok(deps);
            }

            debug!(task = %task, "cache miss: querying inner lookup");
            let result = self.inner.dependencies(task, context).await;
            if let Ok(deps) = &result {
                self.store(key, deps.clone());
            }
            result
        })
    }
}
