// src/config/validate.rs

//! Aggregated configuration validation.
//!
//! Every check runs even when earlier ones fail, so the user sees the
//! complete list of problems in one pass rather than fixing them one
//! rerun at a time.

use std::collections::BTreeMap;
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::config::fuzzy::suggest_closest;
use crate::config::model::{RawConfigFile, TaskConfig, SUPPORTED_TOOLS};
use crate::template;

/// What part of the config an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Structure,
    Agent,
    Task,
    Cycle,
    Template,
}

/// One structured validation error.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    /// The offending agent or task key, when the error has one.
    pub location: Option<String>,
    pub message: String,
}

impl ConfigError {
    fn structure(message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Structure,
            location: None,
            message: message.into(),
        }
    }

    fn agent(name: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Agent,
            location: Some(name.to_string()),
            message: message.into(),
        }
    }

    fn task(name: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Task,
            location: Some(name.to_string()),
            message: message.into(),
        }
    }

    fn cycle(message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Cycle,
            location: None,
            message: message.into(),
        }
    }

    fn template(name: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Template,
            location: Some(name.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The aggregate of all validation errors for one config.
///
/// Empty means success; [`validate`] never returns an empty instance.
#[derive(Debug, Clone, Default)]
pub struct ConfigErrors {
    pub errors: Vec<ConfigError>,
}

impl ConfigErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether any error message contains `needle` (test/diagnostic helper).
    pub fn any_contains(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.message.contains(needle))
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no configuration errors"),
            [single] => write!(f, "{}", single),
            many => {
                writeln!(f, "{} configuration errors:", many.len())?;
                for err in many {
                    writeln!(f, "  - {}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigErrors {}

/// Validate an already-parsed config, returning every violation found.
///
/// Check order (none short-circuits the others):
/// 1. at least one agent and one task
/// 2. per-agent tool checks (with fuzzy suggestions for near-miss names)
/// 3. per-task agent reference, prompt xor prompt_file, `needs` references
/// 4. cycle detection over the full dependency graph
/// 5. template references: target exists and is in the task's `needs`
pub fn validate(cfg: &RawConfigFile) -> Result<(), ConfigErrors> {
    let mut errors = Vec::new();

    check_structure(cfg, &mut errors);
    check_agents(cfg, &mut errors);
    check_tasks(cfg, &mut errors);
    check_cycles(&cfg.tasks, &mut errors);
    check_templates(&cfg.tasks, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigErrors { errors })
    }
}

fn check_structure(cfg: &RawConfigFile, errors: &mut Vec<ConfigError>) {
    if cfg.agents.is_empty() {
        errors.push(ConfigError::structure("no agents defined"));
    }
    if cfg.tasks.is_empty() {
        errors.push(ConfigError::structure("no tasks defined"));
    }
}

fn check_agents(cfg: &RawConfigFile, errors: &mut Vec<ConfigError>) {
    for (name, agent) in cfg.agents.iter() {
        if agent.tool.is_empty() {
            errors.push(ConfigError::agent(
                name,
                format!("agent \"{}\": tool is required", name),
            ));
            continue;
        }

        if !SUPPORTED_TOOLS.contains(&agent.tool.as_str()) {
            let mut msg = format!("agent \"{}\": unsupported tool \"{}\"", name, agent.tool);
            if let Some(suggestion) = suggest_closest(&agent.tool, SUPPORTED_TOOLS) {
                msg.push_str(&format!(" (did you mean \"{}\"?)", suggestion));
            }
            errors.push(ConfigError::agent(name, msg));
        }
    }
}

fn check_tasks(cfg: &RawConfigFile, errors: &mut Vec<ConfigError>) {
    for (name, task) in cfg.tasks.iter() {
        if task.agent.is_empty() {
            errors.push(ConfigError::task(
                name,
                format!("task \"{}\": agent is required", name),
            ));
        } else if !cfg.agents.contains_key(&task.agent) {
            errors.push(ConfigError::task(
                name,
                format!(
                    "task \"{}\" references undefined agent \"{}\"",
                    name, task.agent
                ),
            ));
        }

        match (&task.prompt, &task.prompt_file) {
            (None, None) => errors.push(ConfigError::task(
                name,
                format!("task \"{}\" has no prompt defined", name),
            )),
            (Some(_), Some(_)) => errors.push(ConfigError::task(
                name,
                format!(
                    "task \"{}\" cannot have both 'prompt' and 'prompt_file'",
                    name
                ),
            )),
            _ => {}
        }

        for dep in task.needs.iter() {
            if dep == name {
                errors.push(ConfigError::task(
                    name,
                    format!("task \"{}\" cannot depend on itself", name),
                ));
            } else if !cfg.tasks.contains_key(dep) {
                errors.push(ConfigError::task(
                    name,
                    format!("task \"{}\" depends on undefined task \"{}\"", name, dep),
                ));
            }
        }
    }
}

/// Cycle detection over the full dependency graph.
///
/// Edge direction: dependency -> dependent, matching the execution order.
/// Strongly connected components with more than one member are cycles;
/// each is reported once, naming its member tasks. Self-loops are already
/// reported as self-dependencies by [`check_tasks`] and are skipped here.
fn check_cycles(tasks: &BTreeMap<String, TaskConfig>, errors: &mut Vec<ConfigError>) {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in tasks.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in tasks.iter() {
        for dep in task.needs.iter() {
            // Only edges between known tasks; missing references were
            // reported above and must not panic the detector.
            if tasks.contains_key(dep) {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }
    }

    for scc in tarjan_scc(&graph) {
        if scc.len() < 2 {
            continue;
        }
        let mut members: Vec<&str> = scc;
        members.sort_unstable();
        errors.push(ConfigError::cycle(format!(
            "circular dependency detected: {}",
            members.join(" -> ")
        )));
    }
}

/// Template-variable validation: every `{{outputs.<t>}}` must name an
/// existing task that the referencing task has listed in `needs`.
fn check_templates(tasks: &BTreeMap<String, TaskConfig>, errors: &mut Vec<ConfigError>) {
    for (name, task) in tasks.iter() {
        let Some(prompt) = task.prompt_text() else {
            continue;
        };

        for referenced in template::referenced_tasks(prompt) {
            if !tasks.contains_key(&referenced) {
                errors.push(ConfigError::template(
                    name,
                    format!(
                        "task \"{}\": template references undefined task \"{}\"",
                        name, referenced
                    ),
                ));
            } else if !task.needs.contains(&referenced) {
                errors.push(ConfigError::template(
                    name,
                    format!(
                        "task \"{}\": template references \"{}\" which is not in 'needs'",
                        name, referenced
                    ),
                ));
            }
        }
    }
}
