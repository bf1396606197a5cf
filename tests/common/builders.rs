#![allow(dead_code)]

use agentdag::config::{AgentConfig, ConfigFile, RawConfigFile, TaskConfig};

/// Builder for workflow configs to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_agent(mut self, name: &str, agent: AgentConfig) -> Self {
        self.config.agents.insert(name.to_string(), agent);
        self
    }

    /// Shorthand: one agent named `runner` backed by claude-code.
    pub fn with_default_agent(self) -> Self {
        self.with_agent("runner", AgentConfigBuilder::new("claude-code").build())
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.tasks.insert(name.to_string(), task);
        self
    }

    pub fn with_max_parallel(mut self, n: usize) -> Self {
        self.config.settings.max_parallel = n;
        self
    }

    pub fn with_stop_on_error(mut self, val: bool) -> Self {
        self.config.settings.stop_on_error = val;
        self
    }

    /// The raw, unvalidated config (for validator tests).
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    /// A validated config; panics if the builder produced an invalid one.
    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `AgentConfig`.
pub struct AgentConfigBuilder {
    agent: AgentConfig,
}

impl AgentConfigBuilder {
    pub fn new(tool: &str) -> Self {
        Self {
            agent: AgentConfig {
                tool: tool.to_string(),
                model: None,
            },
        }
    }

    pub fn model(mut self, model: &str) -> Self {
        self.agent.model = Some(model.to_string());
        self
    }

    pub fn build(self) -> AgentConfig {
        self.agent
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(agent: &str) -> Self {
        Self {
            task: TaskConfig {
                agent: agent.to_string(),
                prompt: None,
                prompt_file: None,
                needs: vec![],
                write: false,
                loaded_prompt: None,
            },
        }
    }

    /// A task bound to the `runner` agent with a placeholder prompt.
    pub fn runner(prompt: &str) -> Self {
        Self::new("runner").prompt(prompt)
    }

    pub fn prompt(mut self, prompt: &str) -> Self {
        self.task.prompt = Some(prompt.to_string());
        self
    }

    pub fn prompt_file(mut self, path: &str) -> Self {
        self.task.prompt_file = Some(path.into());
        self
    }

    pub fn needs(mut self, dep: &str) -> Self {
        self.task.needs.push(dep.to_string());
        self
    }

    pub fn write(mut self, val: bool) -> Self {
        self.task.write = val;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
