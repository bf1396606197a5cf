// src/engine/executor.rs

//! Level-by-level concurrent execution of a validated workflow.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::model::{ConfigFile, Tool};
use crate::dag::graph::DagGraph;
use crate::dag::levels::ExecutionLevels;
use crate::engine::{EngineOptions, TaskName, TaskState};
use crate::errors::{AgentdagError, Result};
use crate::exec::backend::{AgentBackend, AgentInvocation};
use crate::observe::{LifecycleEvent, Observer};
use crate::state::result::{RunResult, TaskResult, TaskStatus, TokenUsage};
use crate::template;

/// Drives one workflow run.
///
/// The engine exclusively owns the in-flight [`RunResult`]; ownership
/// transfers to the caller when [`Engine::run`] returns. Persistence and
/// webhook delivery are the caller's concern.
pub struct Engine<B: AgentBackend> {
    backend: Arc<B>,
    observer: Arc<Observer>,
    options: EngineOptions,
}

impl<B: AgentBackend + 'static> Engine<B> {
    pub fn new(backend: Arc<B>, observer: Arc<Observer>, options: EngineOptions) -> Self {
        Self {
            backend,
            observer,
            options,
        }
    }

    /// Execute every level in order and return the finalized run record.
    ///
    /// Levels execute strictly in ascending order: no task in level i+1
    /// starts before every dispatched task in level i has terminated.
    /// Within a level there is no ordering guarantee.
    pub async fn run(
        &self,
        cfg: &ConfigFile,
        graph: &DagGraph,
        levels: &ExecutionLevels,
    ) -> Result<RunResult> {
        let mut states: HashMap<TaskName, TaskState> = graph
            .tasks()
            .map(|name| (name.to_string(), TaskState::Pending))
            .collect();
        let mut outputs: HashMap<TaskName, String> = HashMap::new();
        let mut run = RunResult::new();

        info!(
            run_id = %run.run_id,
            tasks = graph.len(),
            levels = levels.len(),
            "starting workflow run"
        );
        self.observer.emit(&LifecycleEvent::RunStarted {
            run_id: run.run_id.clone(),
            task_count: graph.len(),
        });

        let mut aborted = false;

        for (level_idx, level) in levels.iter().enumerate() {
            let ready = self.mark_level_ready(cfg, graph, level, &mut states, &mut run);
            if ready.is_empty() {
                continue;
            }

            debug!(level = level_idx, tasks = ?ready, "dispatching level");

            let invocations = self.prepare_invocations(cfg, &ready, &outputs)?;
            let level_failed = self
                .dispatch_level(cfg, invocations, &mut states, &mut outputs, &mut run)
                .await?;

            if level_failed && self.options.stop_on_error {
                warn!(
                    level = level_idx,
                    "task failed with stop_on_error enabled; abandoning remaining levels"
                );
                aborted = true;
                break;
            }
        }

        if aborted {
            self.skip_remaining(cfg, levels, &mut states, &mut run);
        }

        run.finalize();

        info!(
            run_id = %run.run_id,
            success = run.success,
            duration_ms = run.duration_ms(),
            total_tokens = run.token_usage.total_tokens,
            "workflow run finished"
        );
        self.observer.emit(&LifecycleEvent::RunCompleted {
            run_id: run.run_id.clone(),
            duration_ms: run.duration_ms(),
            success: run.success,
            total_tokens: run.token_usage.total_tokens,
        });

        Ok(run)
    }

    /// Partition a level into ready tasks and tasks skipped because an
    /// upstream dependency did not succeed.
    fn mark_level_ready(
        &self,
        cfg: &ConfigFile,
        graph: &DagGraph,
        level: &[String],
        states: &mut HashMap<TaskName, TaskState>,
        run: &mut RunResult,
    ) -> Vec<TaskName> {
        let mut ready = Vec::new();

        for name in level {
            let deps_succeeded = graph
                .dependencies_of(name)
                .iter()
                .all(|dep| states.get(dep.as_str()) == Some(&TaskState::Succeeded));

            if deps_succeeded {
                states.insert(name.clone(), TaskState::Ready);
                ready.push(name.clone());
            } else {
                debug!(task = %name, "upstream dependency failed or was skipped; skipping");
                self.record_skipped(cfg, name, states, run);
            }
        }

        ready
    }

    /// Resolve prompts and build owned invocations before any dispatch.
    ///
    /// Template references are guaranteed resolvable here: validation pins
    /// every reference to a declared dependency, and dependencies complete
    /// in earlier levels. A miss is a logic defect and fails the run.
    fn prepare_invocations(
        &self,
        cfg: &ConfigFile,
        ready: &[TaskName],
        outputs: &HashMap<TaskName, String>,
    ) -> Result<Vec<AgentInvocation>> {
        let mut invocations = Vec::with_capacity(ready.len());

        for name in ready {
            let task = cfg.tasks.get(name).ok_or_else(|| {
                AgentdagError::Internal(format!("task '{}' missing from validated config", name))
            })?;
            let agent = cfg.agent_for(task).ok_or_else(|| {
                AgentdagError::Internal(format!(
                    "task '{}' references agent '{}' missing from validated config",
                    name, task.agent
                ))
            })?;
            let tool = Tool::from_name(&agent.tool).ok_or_else(|| {
                AgentdagError::Internal(format!(
                    "agent '{}' carries unsupported tool '{}' past validation",
                    task.agent, agent.tool
                ))
            })?;
            let raw_prompt = task.prompt_text().ok_or_else(|| {
                AgentdagError::Internal(format!("task '{}' has no prompt past validation", name))
            })?;

            let prompt = template::resolve(name, raw_prompt, outputs)?;

            invocations.push(AgentInvocation {
                task: name.clone(),
                tool,
                model: agent.model.clone(),
                prompt,
                workdir: self.options.workdir.clone(),
                write: task.write,
            });
        }

        Ok(invocations)
    }

    /// Run one level's invocations concurrently, bounded by the capacity
    /// limit, and merge results as they complete.
    ///
    /// Returns whether any task in the level failed.
    async fn dispatch_level(
        &self,
        cfg: &ConfigFile,
        invocations: Vec<AgentInvocation>,
        states: &mut HashMap<TaskName, TaskState>,
        outputs: &mut HashMap<TaskName, String>,
        run: &mut RunResult,
    ) -> Result<bool> {
        let permits = match self.options.max_parallel {
            0 => invocations.len(),
            n => n.min(invocations.len()),
        };
        let semaphore = Arc::new(Semaphore::new(permits.max(1)));
        let mut join_set: JoinSet<(TaskName, TaskResult)> = JoinSet::new();

        for invocation in invocations {
            let name = invocation.task.clone();
            let agent_name = cfg
                .tasks
                .get(&name)
                .map(|t| t.agent.clone())
                .unwrap_or_default();

            states.insert(name.clone(), TaskState::Running);

            let backend = Arc::clone(&self.backend);
            let observer = Arc::clone(&self.observer);
            let semaphore = Arc::clone(&semaphore);

            join_set.spawn(async move {
                let result =
                    run_one_task(backend, observer, semaphore, invocation, agent_name).await;
                (name, result)
            });
        }

        let mut level_failed = false;

        while let Some(joined) = join_set.join_next().await {
            let (name, result) = joined.map_err(|err| {
                AgentdagError::Internal(format!("task worker panicked: {}", err))
            })?;

            if result.is_success() {
                info!(task = %name, duration_ms = result.duration_ms, "task succeeded");
                states.insert(name.clone(), TaskState::Succeeded);
                outputs.insert(name.clone(), result.stdout.clone());
            } else {
                warn!(
                    task = %name,
                    exit_code = result.exit_code,
                    "task failed"
                );
                states.insert(name.clone(), TaskState::Failed);
                level_failed = true;
            }

            run.push_task(result);
        }

        Ok(level_failed)
    }

    /// After a stop-on-error abort, mark every not-yet-started task as
    /// skipped, in level order, so the run record is complete.
    fn skip_remaining(
        &self,
        cfg: &ConfigFile,
        levels: &ExecutionLevels,
        states: &mut HashMap<TaskName, TaskState>,
        run: &mut RunResult,
    ) {
        for level in levels.iter() {
            for name in level {
                if states.get(name.as_str()) == Some(&TaskState::Pending) {
                    self.record_skipped(cfg, name, states, run);
                }
            }
        }
    }

    fn record_skipped(
        &self,
        cfg: &ConfigFile,
        name: &str,
        states: &mut HashMap<TaskName, TaskState>,
        run: &mut RunResult,
    ) {
        let (agent, tool, model) = cfg
            .tasks
            .get(name)
            .and_then(|task| {
                cfg.agent_for(task)
                    .map(|a| (task.agent.clone(), a.tool.clone(), a.model.clone()))
            })
            .unwrap_or_default();

        states.insert(name.to_string(), TaskState::Skipped);
        run.push_task(TaskResult::skipped(name, &agent, &tool, model));
        self.observer.emit(&LifecycleEvent::TaskSkipped {
            task: name.to_string(),
        });
    }
}

/// Execute a single task invocation under the level's concurrency limit.
///
/// Backend errors ("cannot be started") become a failed [`TaskResult`]
/// rather than a control-flow error; per-task failures never cross task
/// boundaries as exceptions.
async fn run_one_task<B: AgentBackend>(
    backend: Arc<B>,
    observer: Arc<Observer>,
    semaphore: Arc<Semaphore>,
    invocation: AgentInvocation,
    agent_name: String,
) -> TaskResult {
    let _permit = semaphore
        .acquire_owned()
        .await
        .expect("level semaphore is never closed");

    observer.emit(&LifecycleEvent::TaskStarted {
        task: invocation.task.clone(),
        tool: invocation.tool.as_str().to_string(),
        model: invocation.model.clone(),
    });

    let started_at = Utc::now();
    let clock = Instant::now();

    let outcome = backend.invoke(invocation.clone()).await;

    let finished_at = Utc::now();
    let duration_ms = clock.elapsed().as_millis() as u64;

    let result = match outcome {
        Ok(output) => {
            let status = if output.exit_code == 0 {
                TaskStatus::Succeeded
            } else {
                TaskStatus::Failed
            };
            TaskResult {
                task: invocation.task.clone(),
                agent: agent_name,
                tool: invocation.tool.as_str().to_string(),
                model: invocation.model.clone(),
                prompt: invocation.prompt.clone(),
                stdout: output.stdout,
                stderr: output.stderr,
                status,
                exit_code: output.exit_code,
                started_at,
                finished_at,
                duration_ms,
                token_usage: output.token_usage.unwrap_or_default(),
            }
        }
        Err(err) => {
            warn!(task = %invocation.task, error = %err, "agent invocation failed to start");
            TaskResult {
                task: invocation.task.clone(),
                agent: agent_name,
                tool: invocation.tool.as_str().to_string(),
                model: invocation.model.clone(),
                prompt: invocation.prompt.clone(),
                stdout: String::new(),
                stderr: err.to_string(),
                status: TaskStatus::Failed,
                exit_code: -1,
                started_at,
                finished_at,
                duration_ms,
                token_usage: TokenUsage::default(),
            }
        }
    };

    observer.emit(&LifecycleEvent::task_finished(
        &result.task,
        result.duration_ms,
        result.exit_code,
        result.is_success(),
        &result.token_usage,
    ));

    result
}
