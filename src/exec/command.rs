// src/exec/command.rs

//! Production agent backend: spawns the agent tool's CLI.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::model::Tool;
use crate::errors::Result;
use crate::exec::backend::{AgentBackend, AgentInvocation, AgentOutput};
use crate::state::result::TokenUsage;

/// Spawns one CLI process per invocation and waits for it to exit.
///
/// No timeout is imposed here; an agent is allowed to run as long as it
/// needs.
#[derive(Debug, Default)]
pub struct CliAgentBackend;

impl CliAgentBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AgentBackend for CliAgentBackend {
    fn invoke(
        &self,
        invocation: AgentInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<AgentOutput>> + Send + '_>> {
        Box::pin(async move { run_agent_process(invocation).await })
    }
}

async fn run_agent_process(invocation: AgentInvocation) -> Result<AgentOutput> {
    let mut cmd = build_command(&invocation);

    info!(
        task = %invocation.task,
        tool = invocation.tool.as_str(),
        model = invocation.model.as_deref(),
        write = invocation.write,
        "starting agent process"
    );

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = cmd
        .output()
        .await
        .with_context(|| format!("spawning agent process for task '{}'", invocation.task))?;

    let exit_code = output.status.code().unwrap_or(-1);
    let raw_stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    debug!(
        task = %invocation.task,
        exit_code,
        stdout_bytes = raw_stdout.len(),
        stderr_bytes = stderr.len(),
        "agent process exited"
    );

    let (stdout, token_usage) = match invocation.tool {
        Tool::ClaudeCode => parse_claude_output(&invocation.task, &raw_stdout),
        Tool::Opencode => (raw_stdout, None),
    };

    Ok(AgentOutput {
        stdout,
        stderr,
        exit_code,
        token_usage,
    })
}

fn build_command(invocation: &AgentInvocation) -> Command {
    let mut cmd = match invocation.tool {
        Tool::ClaudeCode => {
            let mut c = Command::new("claude");
            c.arg("-p")
                .arg(&invocation.prompt)
                .arg("--output-format")
                .arg("json");
            if let Some(model) = &invocation.model {
                c.arg("--model").arg(model);
            }
            if invocation.write {
                c.arg("--permission-mode").arg("acceptEdits");
            }
            c
        }
        Tool::Opencode => {
            let mut c = Command::new("opencode");
            c.arg("run").arg(&invocation.prompt);
            if let Some(model) = &invocation.model {
                c.arg("--model").arg(model);
            }
            c
        }
    };

    if let Some(dir) = &invocation.workdir {
        cmd.current_dir(dir);
    }

    cmd
}

/// Pull the result text and usage counters out of claude-code's JSON
/// output.
///
/// Falls back to the raw stdout when the output isn't the expected JSON
/// (older tool versions, or the process died before printing it).
fn parse_claude_output(task: &str, raw: &str) -> (String, Option<TokenUsage>) {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(err) => {
            warn!(task = %task, error = %err, "agent stdout is not JSON; using raw text");
            return (raw.to_string(), None);
        }
    };

    let text = value
        .get("result")
        .and_then(|r| r.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| raw.to_string());

    let usage = value.get("usage").map(|u| {
        TokenUsage::new(
            read_count(u, "input_tokens"),
            read_count(u, "output_tokens"),
            read_count(u, "cache_read_input_tokens"),
            read_count(u, "cache_creation_input_tokens"),
        )
    });

    (text, usage)
}

fn read_count(usage: &serde_json::Value, field: &str) -> u64 {
    usage.get(field).and_then(|v| v.as_u64()).unwrap_or(0)
}
