//! Collection of definitions from registration sources.

use keel_engine::manager::ExecutionManager;
use keel_model::error::BuildError;
use keel_plugin::registry::{Definition, Registry};
use keel_plugin::source::RegistrationSource;

/// Runs registration sources and feeds what they define into a manager.
///
/// Collecting and applying are separate steps so the reactor can require a
/// source's plugins before its own definitions are registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct Collector;

impl Collector {
    /// Creates a collector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs `source` against a fresh [`Registry`].
    ///
    /// # Errors
    ///
    /// Returns any error the source raises while registering.
    pub fn collect(&self, source: &dyn RegistrationSource) -> Result<Registry, BuildError> {
        let mut registry = Registry::new(source.name());
        source.register(&mut registry)?;
        tracing::debug!(
            source = %source.name(),
            definitions = registry.definitions().len(),
            requirements = registry.requirements().len(),
            "collected registration source"
        );
        Ok(registry)
    }

    /// Registers `definitions` with `manager` in declaration order.
    pub fn apply(&self, definitions: Vec<Definition>, manager: &mut ExecutionManager) {
        for definition in definitions {
            match definition {
                Definition::Task(task) => manager.register_task(task),
                Definition::Action(action) => manager.register_action(action),
                Definition::Initializer(initializer) => manager.register_initializer(initializer),
            }
        }
    }
}
