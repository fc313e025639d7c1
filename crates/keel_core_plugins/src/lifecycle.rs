//! The builtin `core` plugin: standard directories and lifecycle tasks.
//!
//! # Properties
//!
//! | Property      | Default                 |
//! |---------------|-------------------------|
//! | `dir_target`  | `target`                |
//! | `dir_reports` | `$dir_target/reports`   |
//! | `dir_logs`    | `$dir_target/logs`      |
//!
//! Defaults only apply to properties the project or an override has not set.
//!
//! # Tasks
//!
//! ```text
//! clean
//! prepare → compile_sources → run_unit_tests → package
//!         → run_integration_tests → verify → publish → install
//! ```
//!
//! `clean` removes the target directory and `prepare` creates the three
//! directories. The remaining tasks are lifecycle phases: they do nothing by
//! themselves and exist so other plugins can extend them or hook actions
//! before and after them.

use keel_model::context::Inputs;
use keel_model::error::{BoxError, BuildError};
use keel_model::executable::Executable;
use keel_model::initializer::Initializer;
use keel_model::project::Project;
use keel_model::task::Task;
use keel_plugin::registry::Registry;
use keel_plugin::source::RegistrationSource;

/// Name the core plugin is registered under.
pub const CORE_PLUGIN: &str = "core";

/// Lifecycle phases after `prepare`, each depending on the previous one.
const LIFECYCLE: &[(&str, &str)] = &[
    ("compile_sources", "Compiles source files"),
    ("run_unit_tests", "Runs all unit tests"),
    ("package", "Packages the project"),
    ("run_integration_tests", "Runs integration tests on the packaged project"),
    ("verify", "Verifies the project and possibly integration tests"),
    ("publish", "Publishes the project"),
    ("install", "Installs the published project"),
];

/// The builtin `core` plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct CorePlugin;

impl RegistrationSource for CorePlugin {
    fn name(&self) -> &str {
        CORE_PLUGIN
    }

    fn register(&self, registry: &mut Registry) -> Result<(), BuildError> {
        registry.initializer(Initializer::new(
            Executable::new("init_core_properties", init_core_properties)?
                .needs::<Project>()
                .describe("Sets default directory properties"),
        ));

        registry
            .task(Task::new(
                Executable::new("clean", clean)?
                    .needs::<Project>()
                    .describe("Cleans the generated output"),
            ))
            .task(Task::new(
                Executable::new("prepare", prepare)?
                    .needs::<Project>()
                    .describe("Prepares the project for building"),
            ));

        let mut previous = "prepare";
        for &(name, description) in LIFECYCLE {
            let phase = Executable::new(name, lifecycle_phase)?.describe(description);
            registry.task(Task::new(phase).depends_on(previous));
            previous = name;
        }

        Ok(())
    }
}

fn init_core_properties(inputs: &Inputs<'_>) -> Result<(), BoxError> {
    let mut project = inputs.get_mut::<Project>()?;
    project.set_property_if_unset("dir_target", "target");
    project.set_property_if_unset("dir_reports", "$dir_target/reports");
    project.set_property_if_unset("dir_logs", "$dir_target/logs");
    Ok(())
}

fn clean(inputs: &Inputs<'_>) -> Result<(), BoxError> {
    let project = inputs.get::<Project>()?;
    let target = project.expand_path(&["$dir_target"])?;
    if target.exists() {
        tracing::info!(path = %target.display(), "removing target directory");
        std::fs::remove_dir_all(&target)?;
    }
    Ok(())
}

fn prepare(inputs: &Inputs<'_>) -> Result<(), BoxError> {
    let project = inputs.get::<Project>()?;
    for property in ["$dir_target", "$dir_reports", "$dir_logs"] {
        let dir = project.expand_path(&[property])?;
        tracing::debug!(path = %dir.display(), "creating directory");
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

fn lifecycle_phase(inputs: &Inputs<'_>) -> Result<(), BoxError> {
    tracing::debug!(phase = %inputs.owner(), "lifecycle phase reached");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_plugin::registry::Definition;

    #[test]
    fn registers_lifecycle_chain() {
        let mut registry = Registry::new(CORE_PLUGIN);
        CorePlugin.register(&mut registry).unwrap();

        let tasks: Vec<_> = registry
            .definitions()
            .iter()
            .filter_map(|definition| match definition {
                Definition::Task(task) => Some(task),
                _ => None,
            })
            .collect();

        let install = tasks.iter().find(|task| task.name() == "install").unwrap();
        assert_eq!(install.dependencies(), ["publish"]);
        let compile = tasks
            .iter()
            .find(|task| task.name() == "compile_sources")
            .unwrap();
        assert_eq!(compile.dependencies(), ["prepare"]);
        assert_eq!(tasks.len(), 2 + LIFECYCLE.len());
    }
}
