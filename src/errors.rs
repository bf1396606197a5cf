// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::config::validate::ConfigErrors;

#[derive(Error, Debug)]
pub enum AgentdagError {
    #[error(transparent)]
    Validation(#[from] ConfigErrors),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A logic defect: the leveler failing to place every task after
    /// cycle-free validation, or a template reference that survived
    /// validation but cannot be resolved at execution time.
    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AgentdagError>;
