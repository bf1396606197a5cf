// src/dag/levels.rs

//! Topological leveling of the dependency graph.
//!
//! Level 0 holds every task with no dependencies; level i+1 holds every
//! task whose dependencies are all in levels <= i. Tasks within a level
//! have no dependency relation to each other and are safe to run
//! concurrently, so this partition yields the maximum available
//! parallelism the DAG permits.

use std::collections::HashMap;

use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::errors::{AgentdagError, Result};

/// Ordered partition of the task set into concurrently-runnable batches.
#[derive(Debug, Clone)]
pub struct ExecutionLevels {
    levels: Vec<Vec<String>>,
}

impl ExecutionLevels {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterate levels in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.levels.iter().map(|l| l.as_slice())
    }

    /// The level index a task was assigned to, if it exists.
    pub fn level_of(&self, task: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.iter().any(|t| t == task))
    }

    /// Total number of tasks across all levels.
    pub fn task_count(&self) -> usize {
        self.levels.iter().map(|l| l.len()).sum()
    }
}

/// Compute execution levels for a validated (acyclic) graph.
///
/// Iterative Kahn-style pass: repeatedly collect the tasks whose
/// dependencies are all already placed, assign them the next level, until
/// every task is placed. Level members are sorted by name so the output is
/// deterministic.
///
/// A leftover unplaced set after no progress means a cycle survived
/// validation, which is a logic defect, not a user-facing config error.
pub fn build_levels(graph: &DagGraph) -> Result<ExecutionLevels> {
    let mut placed: HashMap<&str, usize> = HashMap::new();
    let mut levels: Vec<Vec<String>> = Vec::new();

    while placed.len() < graph.len() {
        let mut ready: Vec<&str> = graph
            .tasks()
            .filter(|name| !placed.contains_key(name))
            .filter(|name| {
                graph
                    .dependencies_of(name)
                    .iter()
                    .all(|dep| placed.contains_key(dep.as_str()))
            })
            .collect();

        if ready.is_empty() {
            let unplaced: Vec<&str> = graph
                .tasks()
                .filter(|name| !placed.contains_key(name))
                .collect();
            return Err(AgentdagError::Internal(format!(
                "leveling made no progress; unplaced tasks: {:?}",
                unplaced
            )));
        }

        ready.sort_unstable();

        let level_idx = levels.len();
        for name in &ready {
            placed.insert(*name, level_idx);
        }

        debug!(level = level_idx, tasks = ?ready, "assigned execution level");
        levels.push(ready.into_iter().map(|s| s.to_string()).collect());
    }

    Ok(ExecutionLevels { levels })
}
