//! End-to-end tests for preparing and running builds through the reactor.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use keel_model::prelude::*;
use keel_plugin::prelude::*;
use keel_reactor::prelude::*;
use parking_lot::Mutex;
use serde_json::json;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// Execution log shared between the test and the build context.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

fn recording(name: &str) -> Result<Executable, BuildError> {
    let entry = name.to_owned();
    Ok(Executable::new(name, move |inputs| {
        inputs.get::<Journal>()?.0.lock().push(entry.clone());
        Ok(())
    })?
    .needs::<Journal>())
}

/// Builtin plugin `lifecycle`: `clean`, `compile(clean)`, `test(compile)`,
/// `package(test)`.
fn lifecycle_plugin() -> FnSource {
    FnSource::new("lifecycle", |registry| {
        registry
            .task(Task::new(recording("clean")?))
            .task(Task::new(recording("compile")?).depends_on("clean"))
            .task(Task::new(recording("test")?).depends_on("compile"))
            .task(Task::new(recording("package")?).depends_on("test"));
        Ok(())
    })
}

fn reactor_with(descriptor: FnDescriptor, chain: ResolverChain) -> (Reactor, Journal) {
    let journal = Journal::default();
    let mut reactor = Reactor::new(chain, StaticDescriptorLoader::new(descriptor));
    reactor.context_mut().insert(journal.clone());
    (reactor, journal)
}

fn builtin_chain() -> ResolverChain {
    ResolverChain::new().with(BuiltinPluginResolver::new().with_plugin("lifecycle", lifecycle_plugin()))
}

fn no_overrides() -> Vec<(String, String)> {
    Vec::new()
}

// ─────────────────────────────────────────────────────────────────────────────
// Preparation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn descriptor_plugins_and_attributes_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.use_plugin("lifecycle");
        registry.task(Task::new(recording("docs")?).depends_on("compile"));
        Ok(())
    })
    .with_attributes(
        ProjectAttributes::new()
            .with_name("demo")
            .with_version("1.2.3")
            .with_default_tasks(["package"])
            .with_license("Apache-2.0"),
    );

    let (mut reactor, _) = reactor_with(descriptor, builtin_chain());
    reactor
        .prepare_build([("jobs", "4"), ("verbose", "true"), ("mode", "fast")], dir.path())
        .unwrap();

    let project = reactor.project().unwrap();
    assert_eq!(project.name, "demo");
    assert_eq!(project.version, "1.2.3");
    assert_eq!(project.license.as_deref(), Some("Apache-2.0"));
    assert_eq!(project.basedir(), dir.path().canonicalize().unwrap());
    assert_eq!(project.get_property("jobs"), Some(&json!(4)));
    assert_eq!(project.get_property("verbose"), Some(&json!(true)));
    assert_eq!(project.get_property("mode"), Some(&json!("fast")));
    drop(project);

    assert!(reactor.execution_manager().is_resolved());
    let docs = reactor.execution_manager().task("docs").unwrap();
    assert_eq!(docs.executables()[0].source(), Some(DESCRIPTOR_SOURCE));
    let clean = reactor.execution_manager().task("clean").unwrap();
    assert_eq!(clean.executables()[0].source(), Some("lifecycle"));
}

#[test]
fn relative_directory_names_the_project() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.task(Task::new(recording("noop")?));
        Ok(())
    })
    .with_attributes(ProjectAttributes::new().with_default_tasks(["noop"]));

    let (mut reactor, journal) = reactor_with(descriptor, ResolverChain::new());
    reactor
        .prepare_build(no_overrides(), dir.path().join("nested/.."))
        .unwrap();

    let root = dir.path().canonicalize().unwrap();
    let expected = root.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(reactor.project().unwrap().name, expected);
    assert_eq!(reactor.project().unwrap().basedir(), root);

    reactor.build_with(&BuildOptions::new()).unwrap();
    assert_eq!(journal.entries(), ["noop"]);
}

#[test]
fn literal_dollar_in_override_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.task(Task::new(recording("noop")?));
        Ok(())
    });

    let (mut reactor, journal) = reactor_with(descriptor, ResolverChain::new());
    reactor
        .prepare_build([("pattern", "^test_.*$")], dir.path())
        .unwrap();

    reactor.build(&["noop"], &[] as &[&str]).unwrap();
    assert_eq!(journal.entries(), ["noop"]);
    assert_eq!(
        reactor.project().unwrap().expand("$pattern").unwrap(),
        "^test_.*$"
    );
}

#[test]
fn missing_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let (mut reactor, _) = reactor_with(FnDescriptor::new(|_| Ok(())), ResolverChain::new());

    let err = reactor.prepare_build(no_overrides(), &missing).unwrap_err();
    assert!(matches!(err, BuildError::ProjectDirectoryMissing(ref path) if *path == missing));
}

#[test]
fn descriptor_loader_can_require_marker_file() {
    let dir = tempfile::tempdir().unwrap();
    let loader =
        StaticDescriptorLoader::new(FnDescriptor::new(|_| Ok(()))).with_required_file("build.keel");
    let mut reactor = Reactor::new(ResolverChain::new(), loader);

    let err = reactor.prepare_build(no_overrides(), dir.path()).unwrap_err();
    assert!(matches!(err, BuildError::DescriptorLoad(_)));

    std::fs::write(dir.path().join("build.keel"), "").unwrap();
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();
}

#[test]
fn missing_plugin_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.use_plugin("pkg:unknown");
        Ok(())
    });
    let (mut reactor, _) = reactor_with(descriptor, builtin_chain());

    let err = reactor.prepare_build(no_overrides(), dir.path()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::MissingPlugin { ref name, cause: PluginError::UnsupportedOrigin(_) }
            if name == "pkg:unknown"
    ));
}

#[test]
fn plugins_are_required_once() {
    let dir = tempfile::tempdir().unwrap();
    let loads = Arc::new(AtomicUsize::new(0));

    let counted = {
        let loads = Arc::clone(&loads);
        FnSource::new("counted", move |registry| {
            loads.fetch_add(1, Ordering::SeqCst);
            registry.action(Action::new(recording("after_compile")?).after("compile"));
            Ok(())
        })
    };
    let extension = FnSource::new("extension", |registry| {
        registry.use_plugin("counted").use_plugin("lifecycle");
        Ok(())
    });

    let chain = ResolverChain::new().with(
        BuiltinPluginResolver::new()
            .with_plugin("lifecycle", lifecycle_plugin())
            .with_plugin("counted", counted)
            .with_plugin("extension", extension),
    );
    let descriptor = FnDescriptor::new(|registry| {
        registry
            .use_plugin("lifecycle")
            .use_plugin("extension")
            .use_plugin("counted");
        Ok(())
    });

    let (mut reactor, journal) = reactor_with(descriptor, chain);
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(reactor.execution_manager().actions().len(), 1);

    reactor.build(&["compile"], &[] as &[&str]).unwrap();
    assert_eq!(journal.entries(), ["clean", "compile", "after_compile"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Building
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn default_tasks_are_built_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.use_plugin("lifecycle");
        Ok(())
    })
    .with_attributes(ProjectAttributes::new().with_default_tasks(["package"]));

    let (mut reactor, journal) = reactor_with(descriptor, builtin_chain());
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();

    assert_eq!(reactor.plan(&[] as &[&str]).unwrap(), ["clean", "compile", "test", "package"]);

    let summary = reactor.build_with(&BuildOptions::new()).unwrap();
    assert_eq!(summary.task_names(), ["clean", "compile", "test", "package"]);
    assert_eq!(journal.entries(), ["clean", "compile", "test", "package"]);
}

#[test]
fn excluded_tasks_skip_but_dependencies_run() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.use_plugin("lifecycle");
        Ok(())
    });

    let (mut reactor, journal) = reactor_with(descriptor, builtin_chain());
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();

    let options = BuildOptions::new()
        .with_task("package")
        .with_excluded_task("test");
    let summary = reactor.build_with(&options).unwrap();

    assert_eq!(summary.task_names(), ["clean", "compile", "package"]);
    assert_eq!(journal.entries(), ["clean", "compile", "package"]);
}

#[test]
fn no_requested_or_default_tasks_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (mut reactor, _) = reactor_with(FnDescriptor::new(|_| Ok(())), ResolverChain::new());
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();

    assert!(matches!(
        reactor.build_with(&BuildOptions::new()),
        Err(BuildError::NoTasksRequested)
    ));
}

#[test]
fn build_before_prepare_is_rejected() {
    let (mut reactor, _) = reactor_with(FnDescriptor::new(|_| Ok(())), ResolverChain::new());
    assert!(matches!(
        reactor.build(&["anything"], &[] as &[&str]),
        Err(BuildError::DependenciesNotResolved)
    ));
}

#[test]
fn invalid_project_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.task(Task::new(recording("noop")?));
        Ok(())
    })
    .with_attributes(ProjectAttributes::new().with_version(""));

    let (mut reactor, journal) = reactor_with(descriptor, ResolverChain::new());
    reactor
        .prepare_build([("dir_dist", "$dir_missing/dist")], dir.path())
        .unwrap();

    match reactor.build(&["noop"], &[] as &[&str]) {
        Err(BuildError::ProjectValidationFailed(messages)) => {
            assert_eq!(messages.len(), 2);
            assert!(messages.iter().any(|m| m.contains("version")));
            assert!(messages.iter().any(|m| m.contains("dir_missing")));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(journal.entries().is_empty());
}

#[test]
fn initializers_see_environments_and_precede_validation() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry
            .initializer(Initializer::new(
                Executable::new("set_output", |inputs| {
                    let envs = inputs.get::<Environments>()?;
                    let mut project = inputs.get_mut::<Project>()?;
                    let output = if envs.contains("ci") { "ci_out" } else { "out" };
                    project.set_property_if_unset("dir_output", output);
                    Ok(())
                })?
                .needs::<Project>()
                .needs::<Environments>(),
            ))
            .initializer(Initializer::new(recording("ci_only")?).in_environment("ci"))
            .task(Task::new(recording("noop")?));
        Ok(())
    });

    let (mut reactor, journal) = reactor_with(descriptor, ResolverChain::new());
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();

    let summary = reactor.build(&["noop"], &["ci"]).unwrap();
    assert_eq!(summary.initializers_run, 2);
    assert_eq!(summary.environments, ["ci"]);
    assert_eq!(journal.entries(), ["ci_only", "noop"]);
    assert_eq!(
        reactor.project().unwrap().get_property_str("dir_output"),
        Some("ci_out")
    );
}

#[test]
fn failing_task_aborts_build() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry.use_plugin("lifecycle");
        registry.task(Task::named(
            "test",
            Executable::new("flaky_test", |_| Err("assertion failed".into()))?,
        )?);
        Ok(())
    });

    let (mut reactor, journal) = reactor_with(descriptor, builtin_chain());
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();

    let err = reactor.build(&["package"], &[] as &[&str]).unwrap_err();
    assert!(matches!(
        err,
        BuildError::BuildFailed { ref executable, .. } if executable == "flaky_test"
    ));
    assert_eq!(journal.entries(), ["clean", "compile", "test"]);
}

#[test]
fn task_listing_is_sorted_and_described() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = FnDescriptor::new(|registry| {
        registry
            .task(Task::new(recording("zip")?).describe("Zips").depends_on("build"))
            .task(Task::new(recording("build")?).describe("Builds"));
        Ok(())
    });

    let (mut reactor, _) = reactor_with(descriptor, ResolverChain::new());
    reactor.prepare_build(no_overrides(), dir.path()).unwrap();

    let tasks = reactor.tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].name, "build");
    assert_eq!(tasks[1].description, "Zips");
    assert_eq!(tasks[1].dependencies, ["build"]);
}
