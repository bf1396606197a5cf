// src/state/persist.rs

//! On-disk persistence of finalized run results.
//!
//! The engine hands the finalized [`RunResult`] to its caller; this module
//! is where the caller writes it. One pretty-printed JSON file per run
//! under `.agentdag/runs/`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::state::result::RunResult;

const RUNS_DIR: &str = ".agentdag/runs";

/// Write a run result as JSON below `base_dir`, returning the file path.
pub fn save_run_result(base_dir: &Path, run: &RunResult) -> Result<PathBuf> {
    let dir = base_dir.join(RUNS_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating run result directory '{}'", dir.display()))?;

    let path = dir.join(format!("{}.json", run.run_id));
    let json = serde_json::to_string_pretty(run)
        .with_context(|| format!("serializing run result '{}'", run.run_id))?;
    fs::write(&path, json)
        .with_context(|| format!("writing run result to '{}'", path.display()))?;

    debug!(path = %path.display(), run_id = %run.run_id, "run result saved");
    Ok(path)
}

/// Read a previously saved run result.
pub fn load_run_result(path: &Path) -> Result<RunResult> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading run result from '{}'", path.display()))?;
    let run = serde_json::from_str(&contents)
        .with_context(|| format!("parsing run result from '{}'", path.display()))?;
    Ok(run)
}
