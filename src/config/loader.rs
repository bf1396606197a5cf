// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::validate::{self, ConfigError, ConfigErrorKind, ConfigErrors};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** load prompt
/// files or perform semantic validation. Use [`load_and_validate`] for the
/// full pipeline.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run full validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Loads `prompt_file` contents (relative to the config's directory) so
///   that template validation covers file-based prompts too.
/// - Runs the aggregated validator and returns the complete error list on
///   failure.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;

    let base_dir = config_base_dir(path);
    let mut errors = load_prompt_files(&mut raw, &base_dir);

    if let Err(validation) = validate::validate(&raw) {
        errors.extend(validation.errors);
    }

    if !errors.is_empty() {
        return Err(ConfigErrors { errors }.into());
    }

    Ok(ConfigFile::new_unchecked(raw))
}

/// Read each task's `prompt_file` into `loaded_prompt`.
///
/// Only tasks with `prompt_file` and no inline `prompt` are touched; the
/// validator reports the "both set" case itself. Unreadable files become
/// aggregated config errors rather than aborting the pass.
fn load_prompt_files(raw: &mut RawConfigFile, base_dir: &Path) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    for (name, task) in raw.tasks.iter_mut() {
        let Some(rel) = task.prompt_file.as_ref() else {
            continue;
        };
        if task.prompt.is_some() {
            continue;
        }

        let full = if rel.is_absolute() {
            rel.clone()
        } else {
            base_dir.join(rel)
        };

        match fs::read_to_string(&full) {
            Ok(text) => task.loaded_prompt = Some(text),
            Err(err) => errors.push(ConfigError {
                kind: ConfigErrorKind::Task,
                location: Some(name.clone()),
                message: format!(
                    "task \"{}\": cannot read prompt_file '{}': {}",
                    name,
                    full.display(),
                    err
                ),
            }),
        }
    }

    errors
}

fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Helper to resolve the default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Agentdag.toml")
}
