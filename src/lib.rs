// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod observe;
pub mod state;
pub mod template;
pub mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::levels::{build_levels, ExecutionLevels};
use crate::dag::visualize;
use crate::dag::DagGraph;
use crate::engine::{Engine, EngineOptions};
use crate::exec::CliAgentBackend;
use crate::observe::Observer;
use crate::state::persist;
use crate::state::result::{RunResult, TaskStatus};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + validation
/// - DAG construction + leveling
/// - graph rendering / dry-run short circuits
/// - the execution engine with the CLI agent backend
/// - result persistence and optional webhook delivery
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let graph = DagGraph::from_config(&cfg);
    let levels = build_levels(&graph)?;

    if let Some(format) = args.graph {
        print!("{}", visualize::render(format, &cfg, &graph, &levels));
        return Ok(());
    }

    if args.dry_run {
        print_dry_run(&cfg, &levels);
        return Ok(());
    }

    let options = engine_options(&cfg, &args);
    let observer = Arc::new(Observer::from_settings(&cfg.settings, args.verbose));
    let backend = Arc::new(CliAgentBackend::new());
    let engine = Engine::new(backend, Arc::clone(&observer), options);

    let result = engine.run(&cfg, &graph, &levels).await?;

    let base_dir = cfg.workdir.clone().unwrap_or_else(|| PathBuf::from("."));
    let saved = persist::save_run_result(&base_dir, &result)?;
    info!(path = %saved.display(), "run result saved");

    if let Some(url) = &cfg.settings.webhook_url {
        if let Err(err) = webhook::deliver(url, &result, &observer).await {
            warn!(error = %err, "webhook delivery failed");
        }
    }

    print_summary(&result);

    if !result.success {
        anyhow::bail!("run {} failed", result.run_id);
    }

    Ok(())
}

/// Merge config settings with per-invocation CLI overrides.
fn engine_options(cfg: &ConfigFile, args: &CliArgs) -> EngineOptions {
    EngineOptions {
        max_parallel: args.max_parallel.unwrap_or(cfg.settings.max_parallel),
        stop_on_error: if args.no_stop_on_error {
            false
        } else {
            cfg.settings.stop_on_error
        },
        workdir: cfg.workdir.clone(),
    }
}

/// Simple dry-run output: print tasks, agents, and the execution plan.
fn print_dry_run(cfg: &ConfigFile, levels: &ExecutionLevels) {
    println!("agentdag dry-run");
    println!("  settings.max_parallel = {}", cfg.settings.max_parallel);
    println!("  settings.stop_on_error = {}", cfg.settings.stop_on_error);
    println!();

    println!("agents ({}):", cfg.agents.len());
    for (name, agent) in cfg.agents.iter() {
        match &agent.model {
            Some(model) => println!("  - {name} ({}/{model})", agent.tool),
            None => println!("  - {name} ({})", agent.tool),
        }
    }
    println!();

    println!("tasks ({}):", cfg.tasks.len());
    for (name, task) in cfg.tasks.iter() {
        println!("  - {name}");
        println!("      agent: {}", task.agent);
        if !task.needs.is_empty() {
            println!("      needs: {:?}", task.needs);
        }
        if task.write {
            println!("      write: true");
        }
    }
    println!();

    println!("plan: {}", visualize::render_compact(levels));
}

/// Per-task outcome table plus run totals.
fn print_summary(result: &RunResult) {
    println!();
    println!("run {} — {}", result.run_id, if result.success { "ok" } else { "failed" });

    for task in &result.tasks {
        let status = match task.status {
            TaskStatus::Succeeded => "ok",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Skipped => "skipped",
        };
        println!("  {:<24} {:<8} {}ms", task.task, status, task.duration_ms);
    }

    println!(
        "  tokens: {} in / {} out ({} total)",
        result.token_usage.input_tokens,
        result.token_usage.output_tokens,
        result.token_usage.total_tokens
    );
}
