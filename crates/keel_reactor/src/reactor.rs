//! The build reactor.
//!
//! [`Reactor`] is the façade a host drives. A build happens in two calls:
//!
//! 1. [`prepare_build`](Reactor::prepare_build) loads the project descriptor,
//!    requires its plugins, applies attributes and property overrides, then
//!    resolves dependencies.
//! 2. [`build`](Reactor::build) runs initializers, validates the project,
//!    plans the requested tasks and executes them.
//!
//! # Example
//!
//! ```
//! use keel_model::prelude::*;
//! use keel_plugin::prelude::*;
//! use keel_reactor::prelude::*;
//!
//! let descriptor = FnDescriptor::new(|registry| {
//!     registry.task(Task::new(Executable::new("hello", |_| Ok(()))?));
//!     Ok(())
//! })
//! .with_attributes(ProjectAttributes::new().with_default_tasks(["hello"]));
//!
//! let mut reactor = Reactor::new(ResolverChain::new(), StaticDescriptorLoader::new(descriptor));
//! reactor
//!     .prepare_build(Vec::<(String, String)>::new(), std::env::temp_dir())
//!     .unwrap();
//!
//! let summary = reactor.build_with(&BuildOptions::new()).unwrap();
//! assert_eq!(summary.task_names(), ["hello"]);
//! ```

use std::path::Path;
use std::time::Instant;

use hashbrown::HashSet;
use keel_engine::manager::ExecutionManager;
use keel_model::context::{BuildContext, Environments, ValueRef};
use keel_model::error::BuildError;
use keel_model::project::Project;
use keel_plugin::requirement::PluginRequirement;
use keel_plugin::resolver::ResolverChain;
use serde_json::Value;

use crate::collector::Collector;
use crate::descriptor::DescriptorLoader;
use crate::summary::{BuildSummary, TaskInfo};

// ─────────────────────────────────────────────────────────────────────────────
// BuildOptions
// ─────────────────────────────────────────────────────────────────────────────

/// What to build and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Requested tasks; empty means the project's default tasks.
    pub tasks: Vec<String>,
    /// Active environment tags.
    pub environments: Vec<String>,
    /// Tasks removed from the plan. Their dependencies still run.
    pub exclude_tasks: Vec<String>,
}

impl BuildOptions {
    /// Creates options that build the default tasks in no environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a task.
    #[must_use]
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.tasks.push(task.into());
        self
    }

    /// Requests several tasks.
    #[must_use]
    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks.extend(tasks.into_iter().map(Into::into));
        self
    }

    /// Activates an environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environments.push(environment.into());
        self
    }

    /// Activates several environments.
    #[must_use]
    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments
            .extend(environments.into_iter().map(Into::into));
        self
    }

    /// Removes a task from the plan.
    #[must_use]
    pub fn with_excluded_task(mut self, task: impl Into<String>) -> Self {
        self.exclude_tasks.push(task.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reactor
// ─────────────────────────────────────────────────────────────────────────────

/// Drives one project through preparation and execution.
pub struct Reactor {
    resolvers: ResolverChain,
    loader: Box<dyn DescriptorLoader>,
    collector: Collector,
    manager: ExecutionManager,
    context: BuildContext,
    required_plugins: HashSet<String>,
}

impl core::fmt::Debug for Reactor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reactor")
            .field("resolvers", &self.resolvers)
            .field("manager", &self.manager)
            .field("context", &self.context)
            .field("required_plugins", &self.required_plugins)
            .finish_non_exhaustive()
    }
}

impl Reactor {
    /// Creates a reactor resolving plugins through `resolvers` and loading
    /// descriptors with `loader`.
    pub fn new(resolvers: ResolverChain, loader: impl DescriptorLoader + 'static) -> Self {
        Self {
            resolvers,
            loader: Box::new(loader),
            collector: Collector::new(),
            manager: ExecutionManager::new(),
            context: BuildContext::new(),
            required_plugins: HashSet::new(),
        }
    }

    /// Requires a plugin for the current build.
    ///
    /// Requiring the same plugin name again is a no-op. The plugin's own
    /// requirements are loaded before its definitions are registered.
    ///
    /// # Errors
    ///
    /// - [`BuildError::MissingPlugin`] if no resolver provides the plugin
    /// - any error raised while the plugin registers
    pub fn require_plugin(&mut self, requirement: &PluginRequirement) -> Result<(), BuildError> {
        if !self.required_plugins.insert(requirement.name().to_owned()) {
            tracing::debug!(plugin = %requirement, "plugin already required");
            return Ok(());
        }

        tracing::debug!(plugin = %requirement, "requiring plugin");
        let source = self.resolvers.resolve(requirement)?;
        let (definitions, requirements) = self.collector.collect(source.as_ref())?.into_parts();

        for nested in &requirements {
            self.require_plugin(nested)?;
        }
        self.collector.apply(definitions, &mut self.manager);
        Ok(())
    }

    /// Prepares a build of the project rooted at `project_directory`.
    ///
    /// The directory is canonicalized, so relative paths such as `.` are
    /// accepted and the project name defaults to the directory's real name.
    ///
    /// Property overrides are parsed as booleans, integers or floats when
    /// possible and stored as strings otherwise. They take precedence over
    /// defaults set later by initializers using
    /// [`Project::set_property_if_unset`].
    ///
    /// # Errors
    ///
    /// - [`BuildError::ProjectDirectoryMissing`] if the directory does not exist
    /// - [`BuildError::DescriptorLoad`] if the descriptor cannot be loaded
    /// - any plugin, registration or resolution error
    pub fn prepare_build<I, K, V>(
        &mut self,
        property_overrides: I,
        project_directory: impl AsRef<Path>,
    ) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let requested = project_directory.as_ref();
        if !requested.is_dir() {
            return Err(BuildError::ProjectDirectoryMissing(requested.to_path_buf()));
        }
        // `.` and `..` have no file name to default the project name from.
        let project_directory = requested
            .canonicalize()
            .map_err(|_| BuildError::ProjectDirectoryMissing(requested.to_path_buf()))?;
        let project_directory = project_directory.as_path();

        self.manager = ExecutionManager::new();
        self.required_plugins.clear();

        let mut project = Project::new(project_directory);
        let descriptor = self.loader.load(project_directory)?;
        let (definitions, requirements) = self.collector.collect(descriptor.as_ref())?.into_parts();

        for requirement in &requirements {
            self.require_plugin(requirement)?;
        }

        descriptor.attributes().apply_to(&mut project);
        for (key, value) in property_overrides {
            project.set_property(key, parse_override(value.as_ref()));
        }

        self.collector.apply(definitions, &mut self.manager);

        tracing::info!(
            project = %project.name,
            version = %project.version,
            basedir = %project.basedir().display(),
            "prepared build"
        );
        self.context.insert(project);
        self.manager.resolve_dependencies()
    }

    /// Builds `tasks` (or the default tasks if empty) with `environments`
    /// active.
    ///
    /// # Errors
    ///
    /// See [`build_with`](Self::build_with).
    pub fn build<T, E>(&mut self, tasks: &[T], environments: &[E]) -> Result<BuildSummary, BuildError>
    where
        T: AsRef<str>,
        E: AsRef<str>,
    {
        let options = BuildOptions::new()
            .with_tasks(tasks.iter().map(|task| task.as_ref()))
            .with_environments(environments.iter().map(|env| env.as_ref()));
        self.build_with(&options)
    }

    /// Runs a build described by `options`.
    ///
    /// # Errors
    ///
    /// - [`BuildError::DependenciesNotResolved`] if the build was not prepared
    /// - [`BuildError::ProjectValidationFailed`] if the project is invalid
    ///   after initialization
    /// - [`BuildError::NoTasksRequested`] if no tasks were requested and the
    ///   project has no default task
    /// - any planning or execution error; execution stops at the first failure
    pub fn build_with(&mut self, options: &BuildOptions) -> Result<BuildSummary, BuildError> {
        let start = Instant::now();
        self.context
            .insert(Environments::new(options.environments.iter().cloned()));

        let initializers_run = self
            .manager
            .execute_initializers(&options.environments, &self.context)?;

        let (project_name, version, tasks) = {
            let project = self.project_ref()?;
            let messages = project.validate();
            if !messages.is_empty() {
                return Err(BuildError::ProjectValidationFailed(messages));
            }
            let tasks = if options.tasks.is_empty() {
                project.default_tasks.clone()
            } else {
                options.tasks.clone()
            };
            (project.name.clone(), project.version.clone(), tasks)
        };
        if tasks.is_empty() {
            return Err(BuildError::NoTasksRequested);
        }

        tracing::info!(
            project = %project_name,
            version = %version,
            tasks = ?tasks,
            environments = ?options.environments,
            "starting build"
        );

        let plan = self
            .manager
            .build_execution_plan(&tasks)?
            .without(&options.exclude_tasks);
        let summaries = self.manager.execute_execution_plan(&plan, &self.context)?;

        let elapsed = start.elapsed();
        tracing::info!(
            project = %project_name,
            tasks = summaries.len(),
            elapsed_ms = elapsed.as_millis(),
            "build finished"
        );

        Ok(BuildSummary {
            project: project_name,
            version,
            environments: options.environments.clone(),
            initializers_run,
            tasks: summaries,
            elapsed,
        })
    }

    /// Returns the task names that building `tasks` would run, in order.
    ///
    /// An empty request plans the project's default tasks.
    ///
    /// # Errors
    ///
    /// Returns the same planning errors as [`build_with`](Self::build_with).
    pub fn plan<S: AsRef<str>>(&self, tasks: &[S]) -> Result<Vec<String>, BuildError> {
        let requested: Vec<String> = if tasks.is_empty() {
            self.project_ref()?.default_tasks.clone()
        } else {
            tasks.iter().map(|task| task.as_ref().to_owned()).collect()
        };
        if requested.is_empty() {
            return Err(BuildError::NoTasksRequested);
        }

        let plan = self.manager.build_execution_plan(&requested)?;
        Ok(plan.names().into_iter().map(str::to_owned).collect())
    }

    /// Lists every registered task, sorted by name.
    #[must_use]
    pub fn tasks(&self) -> Vec<TaskInfo> {
        self.manager
            .tasks()
            .into_iter()
            .map(|task| TaskInfo {
                name: task.name().to_owned(),
                description: task.description(),
                dependencies: task.dependencies().to_vec(),
            })
            .collect()
    }

    /// Returns the project of the prepared build.
    #[must_use]
    pub fn project(&self) -> Option<ValueRef<'_, Project>> {
        self.context.get::<Project>().ok()
    }

    fn project_ref(&self) -> Result<ValueRef<'_, Project>, BuildError> {
        self.context
            .get::<Project>()
            .map_err(|_| BuildError::DependenciesNotResolved)
    }

    /// Returns the build context.
    #[must_use]
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Mutable access to the build context, for host-provided values.
    pub fn context_mut(&mut self) -> &mut BuildContext {
        &mut self.context
    }

    /// Returns the execution manager.
    #[must_use]
    pub fn execution_manager(&self) -> &ExecutionManager {
        &self.manager
    }
}

/// Parses a command-line property override.
fn parse_override(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>()
        && let Some(number) = serde_json::Number::from_f64(float)
    {
        return Value::Number(number);
    }
    Value::String(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn overrides_are_typed() {
        assert_eq!(parse_override("true"), json!(true));
        assert_eq!(parse_override("false"), json!(false));
        assert_eq!(parse_override("42"), json!(42));
        assert_eq!(parse_override("-3"), json!(-3));
        assert_eq!(parse_override("0.5"), json!(0.5));
        assert_eq!(parse_override("NaN"), json!("NaN"));
        assert_eq!(parse_override("target/out"), json!("target/out"));
    }
}
