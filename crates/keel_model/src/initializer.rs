//! Setup steps that run before planning.

use crate::executable::Executable;

/// An executable run once per build before any task, optionally gated on
/// environment tags.
#[derive(Debug, Clone)]
pub struct Initializer {
    executable: Executable,
    environments: Vec<String>,
}

impl Initializer {
    /// Creates an initializer that applies in every environment.
    #[must_use]
    pub fn new(executable: Executable) -> Self {
        Self {
            executable,
            environments: Vec::new(),
        }
    }

    /// Restricts this initializer to builds where `environment` is active.
    ///
    /// Calling this several times widens the gate: any listed tag suffices.
    #[must_use]
    pub fn in_environment(mut self, environment: impl Into<String>) -> Self {
        self.environments.push(environment.into());
        self
    }

    /// Returns the initializer name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.executable.name()
    }

    /// Returns the wrapped executable.
    #[must_use]
    pub fn executable(&self) -> &Executable {
        &self.executable
    }

    /// Mutable access to the wrapped executable.
    pub fn executable_mut(&mut self) -> &mut Executable {
        &mut self.executable
    }

    /// Returns the environment tags; empty means always applicable.
    #[must_use]
    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    /// Returns `true` if the initializer should run for `active` environments.
    #[must_use]
    pub fn is_applicable(&self, active: &[String]) -> bool {
        self.environments.is_empty() || self.environments.iter().any(|tag| active.contains(tag))
    }
}
