//! Error taxonomy shared by every Keel layer.
//!
//! Every failure the engine can report is a variant of [`BuildError`]. Lower
//! level failures ([`PluginError`], [`InputError`], [`PropertyError`]) have
//! their own enums and are nested into a [`BuildError`] where they abort a
//! build.

use std::path::PathBuf;

/// A boxed error raised by an executable's callable.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Errors that abort registration, resolution, planning or execution.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A definition name does not satisfy the identifier rule.
    #[error("invalid name '{0}': expected a letter or '_' followed by letters, digits or '_'")]
    InvalidName(String),

    /// A requested or referenced task is not registered.
    #[error("no such task: {0}")]
    NoSuchTask(String),

    /// A task depends on a task name that is not registered.
    #[error("task '{task}' depends on missing task '{dependency}'")]
    MissingTaskDependency {
        /// The task declaring the dependency.
        task: String,
        /// The dependency name that could not be found.
        dependency: String,
    },

    /// An action hooks a task name that is not registered.
    #[error("action '{action}' is hooked to missing task '{task}'")]
    MissingActionDependency {
        /// The action declaring the hook.
        action: String,
        /// The hooked task name that could not be found.
        task: String,
    },

    /// A dependency cycle was found while building an execution plan.
    ///
    /// `task` depends on `dependency`, which is already being expanded on the
    /// current path. A task depending on itself reports its name twice.
    #[error("circular task dependency: '{task}' depends on '{dependency}'")]
    CircularTaskDependency {
        /// The task whose dependency closes the cycle.
        task: String,
        /// The dependency that is already on the expansion path.
        dependency: String,
    },

    /// An operation needed resolved dependencies but resolution has not run.
    #[error("dependencies have not been resolved")]
    DependenciesNotResolved,

    /// Every plugin resolver failed for the given plugin.
    #[error("missing plugin '{name}'")]
    MissingPlugin {
        /// The plugin name as requested.
        name: String,
        /// The failure reported by the last resolver tried.
        #[source]
        cause: PluginError,
    },

    /// An executable declared an input the build context does not provide.
    #[error("'{executable}' requires {input}, which is not available in the build context")]
    MissingInput {
        /// The executable that declared the input.
        executable: String,
        /// Type name of the missing input.
        input: &'static str,
    },

    /// A task, action or initializer raised an error.
    #[error("'{executable}' failed: {cause}")]
    BuildFailed {
        /// The executable that raised.
        executable: String,
        /// The raised error.
        #[source]
        cause: BoxError,
    },

    /// The project reported validation messages before execution.
    #[error("project validation failed: {}", .0.join("; "))]
    ProjectValidationFailed(Vec<String>),

    /// The project directory handed to the reactor does not exist.
    #[error("project directory does not exist: {}", .0.display())]
    ProjectDirectoryMissing(PathBuf),

    /// The project descriptor could not be loaded.
    #[error("failed to load project descriptor: {0}")]
    DescriptorLoad(#[source] BoxError),

    /// No tasks were requested and the project declares no default task.
    #[error("no tasks requested and the project has no default task")]
    NoTasksRequested,
}

/// Failures reported by a single plugin resolver.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The resolver has no plugin under this name.
    #[error("plugin '{0}' not found")]
    NotFound(String),

    /// The resolver does not handle plugins of this origin.
    #[error("plugin '{0}' has an origin this resolver does not handle")]
    UnsupportedOrigin(String),

    /// The external acquisition step failed.
    #[error("failed to fetch plugin '{name}': {message}")]
    FetchFailed {
        /// The package that was being fetched.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// The plugin was located but could not be loaded.
    #[error("failed to load plugin '{name}': {cause}")]
    LoadFailed {
        /// The plugin location that failed to load.
        name: String,
        /// The underlying load error.
        #[source]
        cause: BoxError,
    },
}

/// Errors raised when an executable reads a value from its inputs.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The value is not present in the build context.
    #[error("input not found: {0}")]
    NotFound(&'static str),

    /// The executable did not declare this input at registration time.
    #[error("input not declared: {0}")]
    Undeclared(&'static str),

    /// The value is currently borrowed in a conflicting way.
    #[error("input already borrowed: {0}")]
    BorrowConflict(&'static str),
}

/// Errors raised by project property expansion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The text references a property that is not defined.
    #[error("undefined property '{0}'")]
    Undefined(String),

    /// A `$` is followed by something that is not a property reference.
    #[error("invalid placeholder at offset {0}")]
    InvalidPlaceholder(usize),

    /// A property expands, directly or indirectly, to itself.
    #[error("property '{0}' references itself")]
    Recursive(String),
}
