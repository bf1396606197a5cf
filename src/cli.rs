// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::dag::visualize::GraphFormat;

/// Command-line arguments for `agentdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "agentdag",
    version,
    about = "Run DAG workflows of AI agent tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Agentdag.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Agentdag.toml")]
    pub config: String,

    /// Parse + validate, print the execution plan, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Render the dependency graph in the given format and exit.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub graph: Option<GraphFormat>,

    /// Override `settings.max_parallel` for this invocation.
    #[arg(long, value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Keep scheduling independent tasks after a failure
    /// (overrides `settings.stop_on_error`).
    #[arg(long)]
    pub no_stop_on_error: bool,

    /// Emit lifecycle events to stderr (overrides `settings.verbose`).
    #[arg(long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AGENTDAG_LOG` or a default level will be used.
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
