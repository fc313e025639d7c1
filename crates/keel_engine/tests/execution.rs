//! Tests for task, plan and initializer execution.


use keel_engine::manager::ExecutionManager;
use keel_model::error::BuildError;
use keel_model::task::Task;
use test_utils::{Journal, action, context_with, failing, initializer, resolved_manager, task};

// ─────────────────────────────────────────────────────────────────────────────
// Hooks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn hooks_wrap_task_executables() {
    let mut manager = ExecutionManager::new();
    manager.register_task(task("compile", &[]));
    manager.register_action(action("announce").before("compile"));
    manager.register_action(action("report").after("compile"));
    manager.resolve_dependencies().unwrap();

    let journal = Journal::default();
    let ctx = context_with(&journal);
    let compile = manager.task("compile").unwrap();
    let summary = manager.execute_task(compile, &ctx).unwrap();

    assert_eq!(journal.entries(), ["announce", "compile", "report"]);
    assert_eq!(summary.task, "compile");
    assert_eq!(summary.actions_fired, 2);
}

#[test]
fn only_once_action_fires_once_across_plan() {
    let mut manager = ExecutionManager::new();
    manager.register_task(task("a", &[]));
    manager.register_task(task("b", &[]));
    manager.register_action(action("hook").after("a").after("b").only_once());
    manager.resolve_dependencies().unwrap();

    let journal = Journal::default();
    let plan = manager.build_execution_plan(&["a", "b"]).unwrap();
    let summaries = manager
        .execute_execution_plan(&plan, &context_with(&journal))
        .unwrap();

    assert_eq!(journal.entries(), ["a", "hook", "b"]);
    assert_eq!(summaries[0].actions_fired, 1);
    assert_eq!(summaries[1].actions_fired, 0);
}

#[test]
fn repeatable_action_fires_for_every_trigger() {
    let mut manager = ExecutionManager::new();
    manager.register_task(task("a", &[]));
    manager.register_task(task("b", &[]));
    manager.register_action(action("hook").after("a").after("b"));
    manager.resolve_dependencies().unwrap();

    let journal = Journal::default();
    let plan = manager.build_execution_plan(&["a", "b"]).unwrap();
    manager
        .execute_execution_plan(&plan, &context_with(&journal))
        .unwrap();

    assert_eq!(journal.count("hook"), 2);
}

#[test]
fn merged_task_runs_every_executable_in_order() {
    let mut manager = ExecutionManager::new();
    for name in ["first", "second", "third"] {
        manager.register_task(Task::named("build", test_utils::recording(name)).unwrap());
    }
    manager.resolve_dependencies().unwrap();

    let journal = Journal::default();
    let build = manager.task("build").unwrap();
    manager.execute_task(build, &context_with(&journal)).unwrap();

    assert_eq!(journal.entries(), ["first", "second", "third"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan Execution
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn plan_aborts_at_first_failure() {
    let mut manager = ExecutionManager::new();
    manager.register_task(task("clean", &[]));
    manager.register_task(Task::new(failing("compile")).depends_on("clean"));
    manager.register_task(task("test", &["compile"]));
    manager.resolve_dependencies().unwrap();

    let journal = Journal::default();
    let plan = manager.build_execution_plan(&["test"]).unwrap();
    let aborted = manager
        .execute_execution_plan(&plan, &context_with(&journal))
        .unwrap_err();

    assert_eq!(journal.entries(), ["clean"]);
    assert_eq!(aborted.completed.len(), 1);
    assert_eq!(aborted.completed[0].task, "clean");
    assert!(matches!(
        aborted.error,
        BuildError::BuildFailed { ref executable, .. } if executable == "compile"
    ));

    let error: BuildError = aborted.into();
    assert!(error.to_string().contains("intentional failure"));
}

#[test]
fn failing_before_hook_skips_task_body() {
    let mut manager = ExecutionManager::new();
    manager.register_task(task("deploy", &[]));
    manager.register_action(keel_model::action::Action::new(failing("guard")).before("deploy"));
    manager.resolve_dependencies().unwrap();

    let journal = Journal::default();
    let deploy = manager.task("deploy").unwrap();
    let result = manager.execute_task(deploy, &context_with(&journal));

    assert!(matches!(result, Err(BuildError::BuildFailed { .. })));
    assert!(journal.entries().is_empty());
}

#[test]
fn missing_input_aborts_task() {
    let manager = resolved_manager(&[("compile", &[])]);
    let compile = manager.task("compile").unwrap();

    let result = manager.execute_task(compile, &keel_model::context::BuildContext::new());
    assert!(matches!(result, Err(BuildError::MissingInput { .. })));
}

#[test]
fn summaries_serialize() {
    let manager = resolved_manager(&[("clean", &[])]);
    let journal = Journal::default();
    let plan = manager.build_execution_plan(&["clean"]).unwrap();
    let summaries = manager
        .execute_execution_plan(&plan, &context_with(&journal))
        .unwrap();

    let json = serde_json::to_value(&summaries).unwrap();
    assert_eq!(json[0]["task"], "clean");
    assert_eq!(json[0]["actions_fired"], 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Initializers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn initializers_are_gated_by_environment() {
    let mut manager = ExecutionManager::new();
    manager.register_initializer(initializer("always"));
    manager.register_initializer(initializer("ci_only").in_environment("ci"));
    manager.resolve_dependencies().unwrap();

    for (active, expected) in [
        (vec![], vec!["always"]),
        (vec!["local".to_owned()], vec!["always"]),
        (vec!["ci".to_owned()], vec!["always", "ci_only"]),
    ] {
        let journal = Journal::default();
        let ran = manager
            .execute_initializers(&active, &context_with(&journal))
            .unwrap();
        assert_eq!(journal.entries(), expected, "active: {active:?}");
        assert_eq!(ran, expected.len());
    }
}

#[test]
fn duplicate_initializer_replaces_earlier() {
    let mut manager = ExecutionManager::new();
    manager.register_initializer(initializer("setup").in_environment("never"));
    manager.register_initializer(initializer("setup"));
    manager.resolve_dependencies().unwrap();

    let journal = Journal::default();
    manager
        .execute_initializers(&[], &context_with(&journal))
        .unwrap();
    assert_eq!(journal.entries(), ["setup"]);
    assert_eq!(manager.initializers().len(), 1);
}
