// src/observe/mod.rs

//! Lifecycle event observer.
//!
//! The engine reports run/task transitions through an explicitly passed
//! [`Observer`] handle rather than any process-wide logger state. Whether
//! anything consumes the events is a configuration concern; the engine
//! behaves identically with a disabled observer.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

use crate::config::model::SettingsSection;
use crate::state::result::TokenUsage;

/// Severity attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl EventLevel {
    fn tag(&self) -> &'static str {
        match self {
            EventLevel::Debug => "DBG",
            EventLevel::Info => "INF",
            EventLevel::Warn => "WRN",
            EventLevel::Error => "ERR",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            EventLevel::Debug => "debug",
            EventLevel::Info => "info",
            EventLevel::Warn => "warn",
            EventLevel::Error => "error",
        }
    }
}

/// Output format for emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFormat {
    #[default]
    Text,
    Json,
}

impl EventFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => EventFormat::Json,
            _ => EventFormat::Text,
        }
    }
}

/// The closed set of lifecycle events the engine can emit.
///
/// Each variant is a fixed record; serialization to a generic key-value
/// mapping happens only at the output boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    RunStarted {
        run_id: String,
        task_count: usize,
    },
    RunCompleted {
        run_id: String,
        duration_ms: u64,
        success: bool,
        total_tokens: u64,
    },
    TaskStarted {
        task: String,
        tool: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    TaskCompleted {
        task: String,
        duration_ms: u64,
        exit_code: i32,
        input_tokens: u64,
        output_tokens: u64,
    },
    TaskFailed {
        task: String,
        duration_ms: u64,
        exit_code: i32,
    },
    TaskSkipped {
        task: String,
    },
    WebhookSent {
        url: String,
        status: u16,
    },
}

impl LifecycleEvent {
    fn level(&self) -> EventLevel {
        match self {
            LifecycleEvent::TaskFailed { .. } => EventLevel::Warn,
            LifecycleEvent::TaskSkipped { .. } => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }

    fn describe(&self) -> String {
        match self {
            LifecycleEvent::RunStarted { run_id, task_count } => {
                format!("run started run_id={} task_count={}", run_id, task_count)
            }
            LifecycleEvent::RunCompleted {
                run_id,
                duration_ms,
                success,
                total_tokens,
            } => format!(
                "run completed run_id={} duration_ms={} success={} total_tokens={}",
                run_id, duration_ms, success, total_tokens
            ),
            LifecycleEvent::TaskStarted { task, tool, model } => match model {
                Some(m) => format!("task started task={} tool={} model={}", task, tool, m),
                None => format!("task started task={} tool={}", task, tool),
            },
            LifecycleEvent::TaskCompleted {
                task,
                duration_ms,
                exit_code,
                input_tokens,
                output_tokens,
            } => format!(
                "task completed task={} duration_ms={} exit_code={} input_tokens={} output_tokens={}",
                task, duration_ms, exit_code, input_tokens, output_tokens
            ),
            LifecycleEvent::TaskFailed {
                task,
                duration_ms,
                exit_code,
            } => format!(
                "task failed task={} duration_ms={} exit_code={}",
                task, duration_ms, exit_code
            ),
            LifecycleEvent::TaskSkipped { task } => format!("task skipped task={}", task),
            LifecycleEvent::WebhookSent { url, status } => {
                format!("webhook sent url={} status={}", url, status)
            }
        }
    }

    /// Shorthand for a completed-or-failed event from timing + outcome.
    pub fn task_finished(
        task: &str,
        duration_ms: u64,
        exit_code: i32,
        success: bool,
        usage: &TokenUsage,
    ) -> Self {
        if success {
            LifecycleEvent::TaskCompleted {
                task: task.to_string(),
                duration_ms,
                exit_code,
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
            }
        } else {
            LifecycleEvent::TaskFailed {
                task: task.to_string(),
                duration_ms,
                exit_code,
            }
        }
    }
}

/// Explicitly passed observability handle.
pub struct Observer {
    enabled: bool,
    min_level: EventLevel,
    format: EventFormat,
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("enabled", &self.enabled)
            .field("min_level", &self.min_level)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Observer {
    pub fn new(
        enabled: bool,
        min_level: EventLevel,
        format: EventFormat,
        output: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            enabled,
            min_level,
            format,
            output: Mutex::new(output),
        }
    }

    /// An observer that drops every event.
    pub fn disabled() -> Self {
        Self::new(
            false,
            EventLevel::Info,
            EventFormat::Text,
            Box::new(io::sink()),
        )
    }

    /// Build an observer from config settings; `verbose_flag` is the CLI
    /// override that force-enables event output for one invocation.
    pub fn from_settings(settings: &SettingsSection, verbose_flag: bool) -> Self {
        Self::new(
            settings.verbose || verbose_flag,
            EventLevel::Info,
            EventFormat::parse(&settings.log_format),
            Box::new(io::stderr()),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit one lifecycle event, if enabled and at/above the level gate.
    ///
    /// Output failures are swallowed: observability must never affect
    /// engine correctness.
    pub fn emit(&self, event: &LifecycleEvent) {
        let level = event.level();
        if !self.enabled || level < self.min_level {
            return;
        }

        let now = Utc::now();
        let line = match self.format {
            EventFormat::Text => {
                format!("{} [{}] {}", now.format("%H:%M:%S"), level.tag(), event.describe())
            }
            EventFormat::Json => {
                #[derive(Serialize)]
                struct Envelope<'a> {
                    time: chrono::DateTime<Utc>,
                    level: &'static str,
                    #[serde(flatten)]
                    event: &'a LifecycleEvent,
                }
                let envelope = Envelope {
                    time: now,
                    level: level.name(),
                    event,
                };
                match serde_json::to_string(&envelope) {
                    Ok(json) => json,
                    Err(err) => format!(r#"{{"error":"failed to serialize event: {}"}}"#, err),
                }
            }
        };

        if let Ok(mut out) = self.output.lock() {
            let _ = writeln!(out, "{}", line);
        }
    }
}
