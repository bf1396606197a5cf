// src/dag/visualize.rs

//! Read-only graph rendering: ASCII boxes, Graphviz DOT, or a compact
//! one-liner. Pure presentation over the DAG and its levels; the engine
//! never depends on this.

use clap::ValueEnum;

use crate::config::model::ConfigFile;
use crate::dag::graph::DagGraph;
use crate::dag::levels::ExecutionLevels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Ascii,
    Dot,
    Compact,
}

/// Render the DAG in the requested format.
pub fn render(
    format: GraphFormat,
    cfg: &ConfigFile,
    graph: &DagGraph,
    levels: &ExecutionLevels,
) -> String {
    match format {
        GraphFormat::Ascii => render_ascii(cfg, graph, levels),
        GraphFormat::Dot => render_dot(cfg, graph, levels),
        GraphFormat::Compact => render_compact(levels),
    }
}

/// Tool/model label for a task's box, e.g. `claude-code/sonnet`.
fn task_label(cfg: &ConfigFile, task: &str) -> String {
    let Some(spec) = cfg.tasks.get(task) else {
        return String::new();
    };
    let Some(agent) = cfg.agents.get(&spec.agent) else {
        return String::new();
    };
    match &agent.model {
        Some(model) => format!("{}/{}", agent.tool, model),
        None => agent.tool.clone(),
    }
}

fn render_ascii(cfg: &ConfigFile, graph: &DagGraph, levels: &ExecutionLevels) -> String {
    if graph.is_empty() {
        return "No tasks to display.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "\n◆ Execution Graph ({} tasks, {} levels)\n",
        graph.len(),
        levels.len()
    ));
    out.push_str("═══════════════════════════════════════════════════════\n\n");

    let all_levels: Vec<&[String]> = levels.iter().collect();
    for (idx, level) in all_levels.iter().enumerate() {
        out.push_str(&render_level(cfg, idx, level));

        if idx + 1 < all_levels.len() && connects_to_next(graph, level, all_levels[idx + 1]) {
            out.push_str("        │\n        ▼\n");
        }
        out.push('\n');
    }

    out.push_str("─────────────────────────────────────────────────────────\n");
    out.push_str("Legend: ┌─┐ task box │ → dependency │ ▼ flow direction\n");

    out
}

fn render_level(cfg: &ConfigFile, idx: usize, tasks: &[String]) -> String {
    // Levels are already name-sorted by the leveler.
    let box_width = tasks
        .iter()
        .map(|t| t.len() + 4)
        .max()
        .unwrap_or(14)
        .clamp(14, 20);

    let parallel_note = if tasks.len() > 1 { " (parallel)" } else { "" };

    let mut out = format!("Level {}{}:\n", idx, parallel_note);

    let border = |left: char, right: char| {
        let mut line = String::from("  ");
        for i in 0..tasks.len() {
            if i > 0 {
                line.push_str("   ");
            }
            line.push(left);
            line.push_str(&"─".repeat(box_width));
            line.push(right);
        }
        line.push('\n');
        line
    };

    let row = |texts: Vec<String>| {
        let mut line = String::from("  ");
        for (i, text) in texts.iter().enumerate() {
            if i > 0 {
                line.push_str("   ");
            }
            let mut text = text.clone();
            if text.len() > box_width - 2 {
                text.truncate(box_width - 5);
                text.push_str("...");
            }
            let padding = box_width - text.len();
            let left = padding / 2;
            line.push('│');
            line.push_str(&" ".repeat(left));
            line.push_str(&text);
            line.push_str(&" ".repeat(padding - left));
            line.push('│');
        }
        line.push('\n');
        line
    };

    out.push_str(&border('┌', '┐'));
    out.push_str(&row(tasks.to_vec()));
    out.push_str(&row(tasks.iter().map(|t| task_label(cfg, t)).collect()));
    out.push_str(&border('└', '┘'));

    out
}

fn connects_to_next(graph: &DagGraph, current: &[String], next: &[String]) -> bool {
    next.iter().any(|task| {
        graph
            .dependencies_of(task)
            .iter()
            .any(|dep| current.contains(dep))
    })
}

fn render_dot(cfg: &ConfigFile, graph: &DagGraph, levels: &ExecutionLevels) -> String {
    let mut out = String::new();

    out.push_str("digraph ExecutionGraph {\n");
    out.push_str("    rankdir=TB;\n");
    out.push_str("    node [shape=box, style=rounded, fontname=\"Arial\"];\n");
    out.push_str("    edge [arrowhead=vee];\n\n");

    for (idx, level) in levels.iter().enumerate() {
        out.push_str(&format!("    subgraph cluster_level{} {{\n", idx));
        out.push_str(&format!("        label=\"Level {}\";\n", idx));
        out.push_str("        style=dashed;\n");
        out.push_str("        color=gray;\n");

        for task in level {
            let label = match task_label(cfg, task) {
                ref l if l.is_empty() => task.clone(),
                l => format!("{}\\n({})", task, l),
            };
            out.push_str(&format!("        \"{}\" [label=\"{}\"];\n", task, label));
        }
        out.push_str("    }\n\n");
    }

    out.push_str("    // Dependencies\n");
    let mut names: Vec<&str> = graph.tasks().collect();
    names.sort_unstable();
    for task in names {
        for dep in graph.dependencies_of(task) {
            out.push_str(&format!("    \"{}\" -> \"{}\";\n", dep, task));
        }
    }

    out.push_str("}\n");
    out
}

/// Compact one-line plan: `analyze → [lint, review] → implement`.
pub fn render_compact(levels: &ExecutionLevels) -> String {
    if levels.is_empty() {
        return "No tasks".to_string();
    }

    let parts: Vec<String> = levels
        .iter()
        .map(|level| {
            if level.len() == 1 {
                level[0].clone()
            } else {
                format!("[{}]", level.join(", "))
            }
        })
        .collect();

    parts.join(" → ")
}
