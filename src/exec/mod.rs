// src/exec/mod.rs

//! Agent invocation layer.
//!
//! The engine talks to an [`AgentBackend`] instead of spawning processes
//! directly. This keeps process mechanics out of the scheduling logic and
//! makes it easy to swap in a fake backend in tests.
//!
//! - [`backend`] provides the `AgentBackend` trait and its invocation and
//!   output types.
//! - [`command`] provides `CliAgentBackend`, the production implementation
//!   that spawns the agent tool's CLI via `tokio::process`.

pub mod backend;
pub mod command;

pub use backend::{AgentBackend, AgentInvocation, AgentOutput};
pub use command::CliAgentBackend;
