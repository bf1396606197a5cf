// src/state/mod.rs

//! Run/task result records and their on-disk persistence.

pub mod persist;
pub mod result;

pub use result::{RunResult, TaskResult, TaskStatus, TokenUsage};
