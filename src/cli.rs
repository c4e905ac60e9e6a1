// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::TaskId;

/// Command-line arguments for `blockdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "blockdag",
    version,
    about = "Plan parallel batches of interdependent tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the task manifest (TOML).
    #[arg(long, value_name = "PATH", default_value = "Blockdag.toml")]
    pub manifest: PathBuf,

    /// Plan only these tasks (default: every task in the manifest).
    #[arg(long = "task", value_name = "ID", num_args = 1..)]
    pub tasks: Vec<TaskId>,

    /// Print the tasks that can start now instead of a full plan.
    #[arg(long)]
    pub ready: bool,

    /// Tasks already completed (only meaningful with `--ready`).
    #[arg(long, value_name = "ID", num_args = 1.., requires = "ready")]
    pub completed: Vec<TaskId>,

    /// Override `[config].max_concurrency`.
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Override `[config].fetch_timeout_ms`.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Exit with an error if the plan has fetch errors or cycles.
    #[arg(long)]
    pub strict: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BLOCKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
