// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Tools we know how to invoke as agent backends.
///
/// Kept as a central list so the validator can both check membership and
/// offer fuzzy suggestions for near-misses.
pub const SUPPORTED_TOOLS: &[&str] = &["claude-code", "opencode"];

/// An agent tool we can spawn, parsed from the `tool` string of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ClaudeCode,
    Opencode,
}

impl Tool {
    /// Parse a tool name as it appears in the config.
    ///
    /// Returns `None` for anything outside [`SUPPORTED_TOOLS`]; the
    /// validator has already rejected those by the time the engine runs.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "claude-code" => Some(Tool::ClaudeCode),
            "opencode" => Some(Tool::Opencode),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::ClaudeCode => "claude-code",
            Tool::Opencode => "opencode",
        }
    }
}

/// Top-level configuration as read from a TOML file.
///
/// This is a direct mapping of:
///
/// ```toml
/// workdir = "/path/to/project"
///
/// [settings]
/// max_parallel = 2
/// stop_on_error = true
///
/// [agents.analyzer]
/// tool = "claude-code"
/// model = "sonnet"
///
/// [tasks.analyze]
/// agent = "analyzer"
/// prompt = "Analyze the codebase."
///
/// [tasks.review]
/// agent = "analyzer"
/// needs = ["analyze"]
/// prompt = "Review based on: {{outputs.analyze}}"
/// ```
///
/// All sections are optional at parse time; the validator decides what is
/// actually required.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Optional working directory for all agent invocations.
    #[serde(default)]
    pub workdir: Option<PathBuf>,

    /// Run behaviour from `[settings]`.
    #[serde(default)]
    pub settings: SettingsSection,

    /// All agents from `[agents.<name>]`.
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,

    /// All tasks from `[tasks.<name>]`.
    ///
    /// Keys are the *task names* (e.g. `"analyze"`, `"review"`).
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskConfig>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsSection {
    /// Maximum number of tasks running concurrently within a level.
    ///
    /// `0` means "as many as the level has ready tasks".
    #[serde(default)]
    pub max_parallel: usize,

    /// Abandon not-yet-started tasks after the first failure.
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,

    /// Emit lifecycle events (run/task start and completion) to stderr.
    #[serde(default)]
    pub verbose: bool,

    /// Lifecycle event format: `"text"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Optional URL to POST the finalized run result to.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_stop_on_error() -> bool {
    true
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            max_parallel: 0,
            stop_on_error: default_stop_on_error(),
            verbose: false,
            log_format: default_log_format(),
            webhook_url: None,
        }
    }
}

/// `[agents.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AgentConfig {
    /// Which CLI tool backs this agent (see [`SUPPORTED_TOOLS`]).
    #[serde(default)]
    pub tool: String,

    /// Optional model override passed through to the tool.
    #[serde(default)]
    pub model: Option<String>,
}

/// `[tasks.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// Name of the agent that runs this task.
    #[serde(default)]
    pub agent: String,

    /// Inline prompt text. Exactly one of `prompt` / `prompt_file` must be
    /// set; the validator enforces this.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt, relative to the config file.
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,

    /// Dependency list: this task waits for all tasks listed here.
    #[serde(default)]
    pub needs: Vec<String>,

    /// Whether the agent is allowed to mutate the filesystem.
    #[serde(default)]
    pub write: bool,

    /// Contents of `prompt_file`, loaded by the config loader before
    /// validation so template checks cover file-based prompts too.
    #[serde(skip)]
    pub loaded_prompt: Option<String>,
}

impl TaskConfig {
    /// The effective prompt text: inline `prompt`, or the loaded contents
    /// of `prompt_file`.
    ///
    /// `None` only on configs that failed (or skipped) validation.
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .or(self.loaded_prompt.as_deref())
    }
}

/// A validated configuration.
///
/// Construction goes through [`ConfigFile::try_from`] (or
/// [`crate::config::loader::load_and_validate`]), which runs the full
/// aggregated validation pass first.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub workdir: Option<PathBuf>,
    pub settings: SettingsSection,
    pub agents: BTreeMap<String, AgentConfig>,
    pub tasks: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    /// Wrap raw sections without re-validating.
    ///
    /// Only call this with data that already passed [`validate`].
    ///
    /// [`validate`]: crate::config::validate::validate
    pub fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            workdir: raw.workdir,
            settings: raw.settings,
            agents: raw.agents,
            tasks: raw.tasks,
        }
    }

    /// Look up the agent backing a task.
    pub fn agent_for(&self, task: &TaskConfig) -> Option<&AgentConfig> {
        self.agents.get(&task.agent)
    }
}

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AgentdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        crate::config::validate::validate(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}
