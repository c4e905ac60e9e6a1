use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use blockdag::errors::LookupError;
use blockdag::lookup::{DependencyLookup, LookupFuture};
use blockdag::types::{LookupContext, TaskId};

/// Wraps a lookup and makes chosen tasks fail or panic.
pub struct FlakyLookup<L> {
    inner: L,
    failing: BTreeSet<TaskId>,
    panicking: BTreeSet<TaskId>,
}

impl<L: DependencyLookup> FlakyLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            failing: BTreeSet::new(),
            panicking: BTreeSet::new(),
        }
    }

    pub fn failing(mut self, task: u64) -> Self {
        self.failing.insert(TaskId(task));
        self
    }

    pub fn panicking(mut self, task: u64) -> Self {
        self.panicking.insert(TaskId(task));
        self
    }
}

impl<L: DependencyLookup> DependencyLookup for FlakyLookup<L> {
    fn dependencies<'a>(&'a self, task: TaskId, context: &'a LookupContext) -> LookupFuture<'a> {
        Box::pin(async move {
            if self.panicking.contains(&task) {
                panic!("lookup for task {task} blew up");
            }
            if self.failing.contains(&task) {
                return Err(LookupError::Backend(format!("tracker unavailable for {task}")));
            }
            self.inner.dependencies(task, context).await
        })
    }
}

/// Wraps a lookup and delays chosen tasks.
pub struct SlowLookup<L> {
    inner: L,
    delays: HashMap<TaskId, Duration>,
}

impl<L: DependencyLookup> SlowLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            delays: HashMap::new(),
        }
    }

    pub fn delay(mut self, task: u64, by: Duration) -> Self {
        self.delays.insert(TaskId(task), by);
        self
    }

    /// Never answer for `task` (well, not within any test's lifetime).
    pub fn stall(self, task: u64) -> Self {
        self.delay(task, Duration::from_secs(3600))
    }
}

impl<L: DependencyLookup> DependencyLookup for SlowLookup<L> {
    fn dependencies<'a>(&'a self, task: TaskId, context: &'a LookupContext) -> LookupFuture<'a> {
        Box::pin(async move {
            if let Some(delay) = self.delays.get(&task) {
                tokio::time::sleep(*delay).await;
            }
            self.inner.dependencies(task, context).await
        })
    }
}

/// Wraps a lookup, holds every call open for `hold`, and records how many
/// calls were in flight at once.
pub struct GaugedLookup<L> {
    inner: L,
    hold: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl<L: DependencyLookup> GaugedLookup<L> {
    pub fn new(inner: L, hold: Duration) -> Self {
        Self {
            inner,
            hold,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<L: DependencyLookup> DependencyLookup for GaugedLookup<L> {
    fn dependencies<'a>(&'a self, task: TaskId, context: &'a LookupContext) -> LookupFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if !self.hold.is_zero() {
                tokio::time::sleep(self.hold).await;
            }
            let result = self.inner.dependencies(task, context).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

/// Records the context of every call.
pub struct ContextRecordingLookup<L> {
    inner: L,
    seen: std::sync::Mutex<Vec<LookupContext>>,
}

impl<L: DependencyLookup> ContextRecordingLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<LookupContext> {
        self.seen.lock().unwrap().clone()
    }
}

impl<L: DependencyLookup> DependencyLookup for ContextRecordingLookup<L> {
    fn dependencies<'a>(&'a self, task: TaskId, context: &'a LookupContext) -> LookupFuture<'a> {
        self.seen.lock().unwrap().push(context.clone());
        self.inner.dependencies(task, context)
    }
}
