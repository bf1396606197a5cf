// src/dag/mod.rs

//! Dependency graph, execution leveling, and graph rendering.

pub mod graph;
pub mod levels;
pub mod visualize;

pub use graph::DagGraph;
pub use levels::{build_levels, ExecutionLevels};
pub use visualize::GraphFormat;
