// src/config/mod.rs

//! Workflow configuration: serde model, TOML loading, and validation.

pub mod fuzzy;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{AgentConfig, ConfigFile, RawConfigFile, SettingsSection, TaskConfig};
pub use validate::{ConfigError, ConfigErrorKind, ConfigErrors};
