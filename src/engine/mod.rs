// src/engine/mod.rs

//! Workflow execution engine.
//!
//! Walks the execution levels in order; within a level, dispatches ready
//! tasks concurrently up to a configured capacity, resolves prompt
//! templates from prior tasks' captured output, and records results into
//! the in-flight [`RunResult`].
//!
//! [`RunResult`]: crate::state::result::RunResult

use std::path::PathBuf;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Per-run state of a task.
///
/// `pending → ready → running → {succeeded | failed | skipped}`.
/// A task becomes `Ready` when every task in its `needs` has `Succeeded`;
/// a failed task's direct and transitive dependents become `Skipped`
/// without ever being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Ready,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

/// Engine behaviour knobs, resolved from config settings and CLI flags.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Concurrency cap within a level; 0 means "as many as are ready".
    pub max_parallel: usize,
    /// Abandon not-yet-started tasks after the first failure.
    pub stop_on_error: bool,
    /// Working directory passed through to agent invocations.
    pub workdir: Option<PathBuf>,
}

pub mod executor;

pub use executor::Engine;
