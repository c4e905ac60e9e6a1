// src/lookup/mod.rs

//! Pluggable dependency lookup abstraction.
//!
//! The graph builder talks to a `DependencyLookup` instead of a concrete
//! tracker client. Production code would wrap an issue tracker's "blocked by"
//! relation; tests provide in-memory doubles that fail or stall on demand.
//!
//! - [`memory`] holds `StaticLookup`, a lookup over a fixed relation (used by
//!   the CLI, which reads the relation from a manifest).
//! - [`cache`] holds `CachedLookup`, an explicit memoising wrapper.

use std::future::Future;
use std::pin::Pin;

use crate::errors::LookupError;
use crate::types::{LookupContext, TaskId};

pub mod cache;
pub mod memory;

pub use cache::CachedLookup;
pub use memory::StaticLookup;

/// Future returned by [`DependencyLookup::dependencies`].
pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<Vec<TaskId>, LookupError>> + Send + 'a>>;

/// Trait abstracting the "which tasks block this one?" query.
///
/// Implementations must be shareable across the builder's concurrent fetches,
/// hence `&self` and `Send + Sync`. The returned ids may include tasks outside
/// the set being planned, and may contain duplicates; the builder prunes both.
pub trait DependencyLookup: Send + Sync {
    fn dependencies<'a>(&'a self, task: TaskId, context: &'a LookupContext) -> LookupFuture<'a>;
}
