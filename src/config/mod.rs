// src/config/mod.rs

//! Manifest loading and validation for blockdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate scheduler settings and task ids (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_manifest};
pub use model::{Manifest, RawManifest, SchedulerConfig, TaskEntry};
pub use validate::validate_manifest;
