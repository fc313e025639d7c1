//! Staging collection for the definitions of one registration source.

use keel_model::action::Action;
use keel_model::initializer::Initializer;
use keel_model::task::Task;

use crate::requirement::PluginRequirement;

/// A single collected definition.
#[derive(Debug, Clone)]
pub enum Definition {
    /// A task, merged with same-named tasks on registration.
    Task(Task),
    /// A hook action.
    Action(Action),
    /// An environment-gated initializer.
    Initializer(Initializer),
}

impl Definition {
    /// Returns the definition's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Definition::Task(task) => task.name(),
            Definition::Action(action) => action.name(),
            Definition::Initializer(initializer) => initializer.name(),
        }
    }

    /// Returns `"task"`, `"action"` or `"initializer"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Task(_) => "task",
            Definition::Action(_) => "action",
            Definition::Initializer(_) => "initializer",
        }
    }
}

/// Collects what one source contributes, in declaration order.
///
/// Every executable added through the registry is stamped with the source's
/// name.
#[derive(Debug)]
pub struct Registry {
    source: String,
    definitions: Vec<Definition>,
    requirements: Vec<PluginRequirement>,
}

impl Registry {
    /// Creates an empty registry for the source named `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            definitions: Vec::new(),
            requirements: Vec::new(),
        }
    }

    /// Returns the name of the source being collected.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Adds a task.
    pub fn task(&mut self, mut task: Task) -> &mut Self {
        for executable in task.executables_mut() {
            executable.set_source(self.source.as_str());
        }
        self.definitions.push(Definition::Task(task));
        self
    }

    /// Adds an action.
    pub fn action(&mut self, mut action: Action) -> &mut Self {
        action.executable_mut().set_source(self.source.as_str());
        self.definitions.push(Definition::Action(action));
        self
    }

    /// Adds an initializer.
    pub fn initializer(&mut self, mut initializer: Initializer) -> &mut Self {
        initializer
            .executable_mut()
            .set_source(self.source.as_str());
        self.definitions.push(Definition::Initializer(initializer));
        self
    }

    /// Requires the plugin `name` before this source's definitions are
    /// registered.
    pub fn use_plugin(&mut self, name: impl Into<String>) -> &mut Self {
        self.requirements.push(PluginRequirement::new(name));
        self
    }

    /// Requires a specific version of the plugin `name`.
    pub fn use_plugin_version(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> &mut Self {
        self.requirements
            .push(PluginRequirement::new(name).with_version(version));
        self
    }

    /// Returns the collected definitions in declaration order.
    #[must_use]
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Returns the plugin requirements in declaration order.
    #[must_use]
    pub fn requirements(&self) -> &[PluginRequirement] {
        &self.requirements
    }

    /// Splits the registry into its definitions and requirements.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Definition>, Vec<PluginRequirement>) {
        (self.definitions, self.requirements)
    }
}

#[cfg(test)]
mod tests {
    use keel_model::executable::Executable;

    use super::*;

    fn exe(name: &str) -> Executable {
        Executable::new(name, |_| Ok(())).unwrap()
    }

    #[test]
    fn stamps_source_on_every_definition() {
        let mut registry = Registry::new("docs");
        registry
            .task(Task::new(exe("build_docs")))
            .action(Action::new(exe("index_docs")).after("build_docs"))
            .initializer(Initializer::new(exe("init_docs")));

        let sources: Vec<_> = registry
            .definitions()
            .iter()
            .map(|definition| match definition {
                Definition::Task(task) => task.executables()[0].source(),
                Definition::Action(action) => action.executable().source(),
                Definition::Initializer(init) => init.executable().source(),
            })
            .collect();
        assert_eq!(sources, [Some("docs"); 3]);

        let kinds: Vec<_> = registry.definitions().iter().map(Definition::kind).collect();
        assert_eq!(kinds, ["task", "action", "initializer"]);
    }

    #[test]
    fn records_requirements_in_order() {
        let mut registry = Registry::new("project");
        registry.use_plugin("core").use_plugin_version("pkg:docs", "2.0");

        let (_, requirements) = registry.into_parts();
        assert_eq!(requirements[0].name(), "core");
        assert_eq!(requirements[1].version(), Some("2.0"));
    }
}
