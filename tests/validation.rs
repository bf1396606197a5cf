// tests/validation.rs

mod common;
use crate::common::builders::{AgentConfigBuilder, ConfigFileBuilder, TaskConfigBuilder};

use agentdag::config::validate::validate;
use agentdag::config::{ConfigErrors, RawConfigFile};

fn expect_errors(raw: RawConfigFile) -> ConfigErrors {
    validate(&raw).expect_err("expected validation errors, got none")
}

#[test]
fn empty_config_reports_both_omissions() {
    let errors = expect_errors(RawConfigFile::default());

    assert_eq!(errors.len(), 2, "got: {errors}");
    assert!(errors.any_contains("no agents defined"));
    assert!(errors.any_contains("no tasks defined"));
}

#[test]
fn missing_agents_only() {
    let raw = ConfigFileBuilder::new()
        .with_task("task1", TaskConfigBuilder::new("agent1").prompt("test").build())
        .build_raw();

    let errors = expect_errors(raw);

    // "no agents defined" plus the dangling agent reference from task1.
    assert_eq!(errors.len(), 2, "got: {errors}");
    assert!(errors.any_contains("no agents defined"));
    assert!(!errors.any_contains("no tasks defined"));
}

#[test]
fn missing_tasks_only() {
    let raw = ConfigFileBuilder::new().with_default_agent().build_raw();

    let errors = expect_errors(raw);

    assert_eq!(errors.len(), 1, "got: {errors}");
    assert!(errors.any_contains("no tasks defined"));
}

#[test]
fn agent_without_tool_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_agent("agent1", AgentConfigBuilder::new("").build())
        .with_task("task1", TaskConfigBuilder::new("agent1").prompt("test").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("agent \"agent1\": tool is required"));
}

#[test]
fn unsupported_tool_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_agent("agent1", AgentConfigBuilder::new("invalid-tool").build())
        .with_task("task1", TaskConfigBuilder::new("agent1").prompt("test").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("unsupported tool \"invalid-tool\""));
}

#[test]
fn near_miss_tool_gets_a_suggestion() {
    let raw = ConfigFileBuilder::new()
        .with_agent("agent1", AgentConfigBuilder::new("claud-code").build())
        .with_task("task1", TaskConfigBuilder::new("agent1").prompt("test").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(
        errors.any_contains("did you mean \"claude-code\"?"),
        "got: {errors}"
    );
}

#[test]
fn distant_tool_name_gets_no_suggestion() {
    let raw = ConfigFileBuilder::new()
        .with_agent("agent1", AgentConfigBuilder::new("zzzzzzzzzzzz").build())
        .with_task("task1", TaskConfigBuilder::new("agent1").prompt("test").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("unsupported tool"));
    assert!(!errors.any_contains("did you mean"));
}

#[test]
fn valid_supported_tools_pass() {
    let raw = ConfigFileBuilder::new()
        .with_agent("agent1", AgentConfigBuilder::new("claude-code").build())
        .with_agent("agent2", AgentConfigBuilder::new("opencode").build())
        .with_task("task1", TaskConfigBuilder::new("agent1").prompt("test1").build())
        .with_task("task2", TaskConfigBuilder::new("agent2").prompt("test2").build())
        .build_raw();

    assert!(validate(&raw).is_ok());
}

#[test]
fn task_without_agent_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::new("").prompt("test").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("task \"task1\": agent is required"));
}

#[test]
fn undefined_agent_reference_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task(
            "task1",
            TaskConfigBuilder::new("nonexistent").prompt("test").build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("references undefined agent \"nonexistent\""));
}

#[test]
fn task_with_neither_prompt_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::new("runner").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("task \"task1\" has no prompt defined"));
}

#[test]
fn task_with_both_prompts_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task(
            "task1",
            TaskConfigBuilder::new("runner")
                .prompt("test")
                .prompt_file("test.txt")
                .build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("cannot have both 'prompt' and 'prompt_file'"));
}

#[test]
fn undefined_dependency_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task(
            "task1",
            TaskConfigBuilder::runner("test").needs("nonexistent").build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("depends on undefined task \"nonexistent\""));
}

#[test]
fn self_dependency_is_rejected_distinctly() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task(
            "task1",
            TaskConfigBuilder::runner("test").needs("task1").build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("task \"task1\" cannot depend on itself"));
    assert!(
        !errors.any_contains("circular dependency detected"),
        "self-loops are not reported as generic cycles: {errors}"
    );
}

#[test]
fn two_task_cycle_is_reported_with_members() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::runner("a").needs("task2").build())
        .with_task("task2", TaskConfigBuilder::runner("b").needs("task1").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("circular dependency detected"));
    assert!(errors.any_contains("task1"));
    assert!(errors.any_contains("task2"));
}

#[test]
fn three_task_cycle_is_reported() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::runner("a").needs("task2").build())
        .with_task("task2", TaskConfigBuilder::runner("b").needs("task3").build())
        .with_task("task3", TaskConfigBuilder::runner("c").needs("task1").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("circular dependency detected"));
}

#[test]
fn cycle_in_disconnected_subgraph_is_found() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("solo", TaskConfigBuilder::runner("standalone").build())
        .with_task("task1", TaskConfigBuilder::runner("a").needs("task2").build())
        .with_task("task2", TaskConfigBuilder::runner("b").needs("task1").build())
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("circular dependency detected"));
}

#[test]
fn diamond_dependency_is_valid() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::runner("a").build())
        .with_task("task2", TaskConfigBuilder::runner("b").needs("task1").build())
        .with_task("task3", TaskConfigBuilder::runner("c").needs("task1").build())
        .with_task(
            "task4",
            TaskConfigBuilder::runner("d").needs("task2").needs("task3").build(),
        )
        .build_raw();

    assert!(validate(&raw).is_ok());
}

#[test]
fn template_reference_in_needs_is_valid() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::runner("first task").build())
        .with_task(
            "task2",
            TaskConfigBuilder::runner("Use output: {{outputs.task1}}")
                .needs("task1")
                .build(),
        )
        .build_raw();

    assert!(validate(&raw).is_ok());
}

#[test]
fn template_referencing_undefined_task_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task(
            "task1",
            TaskConfigBuilder::runner("Use output: {{outputs.nonexistent}}").build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("template references undefined task \"nonexistent\""));
}

#[test]
fn template_referencing_task_not_in_needs_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::runner("first").build())
        .with_task(
            "task2",
            TaskConfigBuilder::runner("Use output: {{outputs.task1}}").build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("template references \"task1\" which is not in 'needs'"));
}

#[test]
fn template_with_hyphens_and_underscores_is_valid() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task-1_test", TaskConfigBuilder::runner("first").build())
        .with_task(
            "task2",
            TaskConfigBuilder::runner("Use: {{outputs.task-1_test}}")
                .needs("task-1_test")
                .build(),
        )
        .build_raw();

    assert!(validate(&raw).is_ok());
}

#[test]
fn multiple_template_references_are_each_checked() {
    let raw = ConfigFileBuilder::new()
        .with_default_agent()
        .with_task("task1", TaskConfigBuilder::runner("first").build())
        .with_task(
            "task3",
            TaskConfigBuilder::runner("Combine: {{outputs.task1}} and {{outputs.missing}}")
                .needs("task1")
                .build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.any_contains("template references undefined task \"missing\""));
    assert!(!errors.any_contains("\"task1\" which is not in 'needs'"));
}

#[test]
fn all_violations_are_aggregated_in_one_pass() {
    // Unsupported tool + undefined agent + missing prompt + undefined need:
    // all four must surface together.
    let raw = ConfigFileBuilder::new()
        .with_agent("agent1", AgentConfigBuilder::new("not-a-tool").build())
        .with_task("task1", TaskConfigBuilder::new("ghost").prompt("x").build())
        .with_task(
            "task2",
            TaskConfigBuilder::new("agent1").needs("nowhere").build(),
        )
        .build_raw();

    let errors = expect_errors(raw);
    assert!(errors.len() >= 4, "got: {errors}");
    assert!(errors.any_contains("unsupported tool \"not-a-tool\""));
    assert!(errors.any_contains("references undefined agent \"ghost\""));
    assert!(errors.any_contains("task \"task2\" has no prompt defined"));
    assert!(errors.any_contains("depends on undefined task \"nowhere\""));
}

#[test]
fn multi_error_display_counts_errors() {
    let errors = expect_errors(RawConfigFile::default());
    let rendered = errors.to_string();
    assert!(rendered.contains("2 configuration errors"), "got: {rendered}");
}
