//! Named build steps.

use crate::error::BuildError;
use crate::executable::Executable;
use crate::name::validate_name;

/// A named build step made of one or more executables.
///
/// Registering a task under a name that already exists extends the existing
/// aggregate: executables, dependencies and descriptions are appended in
/// registration order.
///
/// # Example
///
/// ```
/// use keel_model::executable::Executable;
/// use keel_model::task::Task;
///
/// let compile = Task::new(Executable::new("compile", |_| Ok(())).unwrap())
///     .depends_on("clean")
///     .describe("Compiles the sources");
///
/// assert_eq!(compile.name(), "compile");
/// assert_eq!(compile.dependencies(), ["clean"]);
/// ```
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    executables: Vec<Executable>,
    dependencies: Vec<String>,
    descriptions: Vec<String>,
}

impl Task {
    /// Creates a task exposed under the executable's own name.
    ///
    /// A non-empty executable description becomes the first description
    /// fragment.
    #[must_use]
    pub fn new(executable: Executable) -> Self {
        let name = executable.name().to_owned();
        Self::from_parts(name, executable)
    }

    /// Creates a task exposed under `name` instead of the executable's name.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidName`] if `name` is not an identifier.
    pub fn named(name: impl Into<String>, executable: Executable) -> Result<Self, BuildError> {
        Ok(Self::from_parts(validate_name(name)?, executable))
    }

    fn from_parts(name: String, executable: Executable) -> Self {
        let descriptions = if executable.description().is_empty() {
            Vec::new()
        } else {
            vec![executable.description().to_owned()]
        };
        Self {
            name,
            executables: vec![executable],
            dependencies: Vec::new(),
            descriptions,
        }
    }

    /// Adds a dependency on the task named `task`.
    #[must_use]
    pub fn depends_on(mut self, task: impl Into<String>) -> Self {
        self.dependencies.push(task.into());
        self
    }

    /// Adds dependencies on every task in `tasks`, in order.
    #[must_use]
    pub fn depends_on_all<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(tasks.into_iter().map(Into::into));
        self
    }

    /// Appends a description fragment.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.descriptions.push(description.into());
        self
    }

    /// Merges `other` into this task, keeping this task's name.
    pub fn extend(&mut self, other: Task) {
        self.executables.extend(other.executables);
        self.dependencies.extend(other.dependencies);
        self.descriptions.extend(other.descriptions);
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the executables in registration order.
    #[must_use]
    pub fn executables(&self) -> &[Executable] {
        &self.executables
    }

    /// Mutable access to the executables, e.g. to record their source.
    pub fn executables_mut(&mut self) -> &mut [Executable] {
        &mut self.executables
    }

    /// Returns the dependency names in registration order.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Returns the description fragments in registration order.
    #[must_use]
    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    /// Returns the description fragments joined with a space.
    #[must_use]
    pub fn description(&self) -> String {
        self.descriptions.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exe(name: &str) -> Executable {
        Executable::new(name, |_| Ok(())).unwrap()
    }

    #[test]
    fn named_overrides_executable_name() {
        let task = Task::named("package", exe("make_archive")).unwrap();
        assert_eq!(task.name(), "package");
        assert_eq!(task.executables()[0].name(), "make_archive");
    }

    #[test]
    fn named_validates_override() {
        assert!(matches!(
            Task::named("no-dash", exe("x")),
            Err(BuildError::InvalidName(_))
        ));
    }

    #[test]
    fn executable_description_seeds_task() {
        let task = Task::new(exe("lint").describe("Runs the linter")).describe("Strict.");
        assert_eq!(task.description(), "Runs the linter Strict.");
    }

    #[test]
    fn extend_appends_in_order() {
        let mut first = Task::new(exe("compile")).depends_on("clean");
        let second = Task::named("compile", exe("compile_extra"))
            .unwrap()
            .depends_on_all(["prepare", "clean"])
            .describe("more");

        first.extend(second);

        let names: Vec<_> = first.executables().iter().map(Executable::name).collect();
        assert_eq!(names, ["compile", "compile_extra"]);
        assert_eq!(first.dependencies(), ["clean", "prepare", "clean"]);
        assert_eq!(first.descriptions(), ["more"]);
    }
}
