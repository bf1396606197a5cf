// src/template.rs

//! Prompt template mini-language: `{{outputs.<task>}}` placeholders.
//!
//! A task's prompt may splice in the captured stdout of tasks it depends
//! on. The validator checks every reference up front (task exists and is in
//! `needs`); the engine substitutes literally at dispatch time.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{AgentdagError, Result};

static OUTPUT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*outputs\.([A-Za-z0-9_][A-Za-z0-9_-]*)\s*\}\}")
        .expect("output reference pattern is valid")
});

/// Names of all tasks referenced by `{{outputs.<task>}}` placeholders in
/// `prompt`, in order of first occurrence, without duplicates.
pub fn referenced_tasks(prompt: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in OUTPUT_REF.captures_iter(prompt) {
        let name = &caps[1];
        if !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Substitute every placeholder in `prompt` with the referenced task's
/// captured output.
///
/// A reference with no entry in `outputs` is an internal invariant
/// violation: validation guarantees every reference names a declared
/// dependency, and dependencies complete before their dependents are
/// dispatched.
pub fn resolve(task: &str, prompt: &str, outputs: &HashMap<String, String>) -> Result<String> {
    let mut missing: Vec<String> = Vec::new();

    let resolved = OUTPUT_REF.replace_all(prompt, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match outputs.get(name) {
            Some(text) => text.clone(),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(AgentdagError::Internal(format!(
            "task '{}': unresolvable template reference(s) {:?} at execution time",
            task, missing
        )));
    }

    Ok(resolved.into_owned())
}
