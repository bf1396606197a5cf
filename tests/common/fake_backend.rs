#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use agentdag::errors::Result;
use agentdag::exec::{AgentBackend, AgentInvocation, AgentOutput};
use agentdag::state::TokenUsage;

/// Canned behaviour for one task.
pub struct FakeResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub token_usage: Option<TokenUsage>,
    /// Simulated execution time, to exercise concurrency.
    pub delay_ms: u64,
    /// Simulate "the agent process could not be started".
    pub fail_to_start: bool,
}

impl Default for FakeResponse {
    fn default() -> Self {
        Self {
            exit_code: 0,
            stdout: String::new(),
            token_usage: None,
            delay_ms: 0,
            fail_to_start: false,
        }
    }
}

impl FakeResponse {
    pub fn success(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            ..Self::default()
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    pub fn with_tokens(mut self, input: u64, output: u64) -> Self {
        self.token_usage = Some(TokenUsage::new(input, output, 0, 0));
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// A fake agent backend that:
/// - records every invocation it receives (in completion-independent
///   arrival order)
/// - returns the canned response for the task, or a default success
/// - tracks how many invocations were in flight at once.
#[derive(Default)]
pub struct FakeAgentBackend {
    responses: Mutex<HashMap<String, FakeResponse>>,
    invocations: Mutex<Vec<AgentInvocation>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeAgentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, task: &str, response: FakeResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(task.to_string(), response);
        self
    }

    /// Names of tasks that were actually dispatched, in arrival order.
    pub fn invoked_tasks(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|inv| inv.task.clone())
            .collect()
    }

    /// The recorded invocation for a task, if it was dispatched.
    pub fn invocation_for(&self, task: &str) -> Option<AgentInvocation> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .find(|inv| inv.task == task)
            .cloned()
    }

    /// Highest number of concurrently in-flight invocations observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl AgentBackend for FakeAgentBackend {
    fn invoke(
        &self,
        invocation: AgentInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<AgentOutput>> + Send + '_>> {
        Box::pin(async move {
            self.invocations.lock().unwrap().push(invocation.clone());

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

            let (exit_code, stdout, token_usage, delay_ms, fail_to_start) = {
                let responses = self.responses.lock().unwrap();
                match responses.get(&invocation.task) {
                    Some(r) => (
                        r.exit_code,
                        r.stdout.clone(),
                        r.token_usage,
                        r.delay_ms,
                        r.fail_to_start,
                    ),
                    None => (0, format!("{} output", invocation.task), None, 0, false),
                }
            };

            if delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if fail_to_start {
                return Err(anyhow::anyhow!(
                    "spawning agent process for task '{}' failed",
                    invocation.task
                )
                .into());
            }

            Ok(AgentOutput {
                stdout,
                stderr: String::new(),
                exit_code,
                token_usage,
            })
        })
    }
}
