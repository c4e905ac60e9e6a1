// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Load a manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** validate.
/// Use [`load_and_validate`] for that. Read and parse failures carry the
/// manifest path.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading manifest at {:?}", path))?;

    let raw: RawManifest = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML manifest from {:?}", path))?;

    Ok(raw)
}

/// Parse manifest TOML from a string.
pub fn parse_manifest(contents: &str) -> Result<RawManifest> {
    Ok(toml::from_str(contents)?)
}

/// Load a manifest from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
/// - reads TOML,
/// - applies `[config]` defaults,
/// - checks `max_concurrency`, `fetch_timeout_ms`, and that every
///   `[task.<id>]` key is a task id.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(path)?;
    Manifest::try_from(raw)
}
