// src/state/result.rs

//! Records produced per task and per run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token usage for a task or, aggregated, for a whole run.
///
/// Cache fields stay zero for backends that don't report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    #[serde(default)]
    pub cache_read_tokens: u64,
    #[serde(default)]
    pub cache_write_tokens: u64,
}

impl TokenUsage {
    /// Build a usage record; `total_tokens` is derived as input + output.
    pub fn new(input: u64, output: u64, cache_read: u64, cache_write: u64) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
            cache_read_tokens: cache_read,
            cache_write_tokens: cache_write,
        }
    }

    /// Element-wise accumulation.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.cache_write_tokens += other.cache_write_tokens;
    }
}

/// Terminal state of a task, as reported.
///
/// `Skipped` counts as failure for overall run success but is kept
/// distinct so reporting can say why a task never ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// Outcome of one task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: String,
    pub agent: String,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub prompt: String,
    pub stdout: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    pub status: TaskStatus,
    pub exit_code: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default)]
    pub token_usage: TokenUsage,
}

impl TaskResult {
    /// Record for a task that was never dispatched because an upstream
    /// dependency failed or was skipped.
    pub fn skipped(task: &str, agent: &str, tool: &str, model: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            task: task.to_string(),
            agent: agent.to_string(),
            tool: tool.to_string(),
            model,
            prompt: String::new(),
            stdout: String::new(),
            stderr: String::new(),
            status: TaskStatus::Skipped,
            exit_code: 0,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            token_usage: TokenUsage::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }
}

/// Outcome of one full workflow run.
///
/// Owned by the execution engine while in flight; handed to the caller for
/// reporting and persistence once finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub tasks: Vec<TaskResult>,
    pub token_usage: TokenUsage,
}

impl RunResult {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at: now,
            finished_at: now,
            success: false,
            tasks: Vec::new(),
            token_usage: TokenUsage::default(),
        }
    }

    /// Append a completed (or skipped) task record.
    pub fn push_task(&mut self, result: TaskResult) {
        self.tasks.push(result);
    }

    pub fn task(&self, name: &str) -> Option<&TaskResult> {
        self.tasks.iter().find(|t| t.task == name)
    }

    /// Close the run: stamp the end time, compute overall success as the
    /// conjunction of all task successes, and sum token usage across all
    /// executed tasks (skipped tasks carry zero usage).
    pub fn finalize(&mut self) {
        self.finished_at = Utc::now();
        self.success = !self.tasks.is_empty() && self.tasks.iter().all(|t| t.is_success());

        self.token_usage = TokenUsage::default();
        for task in &self.tasks {
            self.token_usage.accumulate(&task.token_usage);
        }
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at).num_milliseconds().max(0) as u64
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::new()
    }
}
