// src/exec/backend.rs

//! Pluggable agent backend abstraction.
//!
//! Production code uses [`CliAgentBackend`]; tests can provide their own
//! implementation that returns canned outputs without spawning processes.
//!
//! [`CliAgentBackend`]: crate::exec::command::CliAgentBackend

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::config::model::Tool;
use crate::engine::TaskName;
use crate::errors::Result;
use crate::state::result::TokenUsage;

/// Everything a backend needs to run one task.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub task: TaskName,
    pub tool: Tool,
    pub model: Option<String>,
    /// Prompt text with all template placeholders already substituted.
    pub prompt: String,
    pub workdir: Option<PathBuf>,
    /// Whether the agent may mutate the filesystem.
    pub write: bool,
}

/// What came back from the agent process.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Usage counters, when the tool reports them.
    pub token_usage: Option<TokenUsage>,
}

/// Trait abstracting how a ready task's agent is invoked.
///
/// The call is synchronous from the dispatching unit of work's point of
/// view and opaque in its mechanics. An `Err` means the agent could not be
/// started at all; the engine records it as a failed task, never as a
/// process-fatal error.
pub trait AgentBackend: Send + Sync {
    fn invoke(
        &self,
        invocation: AgentInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<AgentOutput>> + Send + '_>>;
}
