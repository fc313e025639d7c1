//! Registration sources: anything that contributes definitions to a build.
//!
//! Project descriptors and plugins are both registration sources. Instead of
//! tagging functions and having them discovered, a source receives a
//! [`Registry`] and adds its definitions explicitly.
//!
//! # Example
//!
//! ```
//! use keel_model::prelude::*;
//! use keel_plugin::registry::Registry;
//! use keel_plugin::source::{FnSource, RegistrationSource};
//!
//! let lint = FnSource::new("lint", |registry| {
//!     registry.task(Task::new(Executable::new("lint", |_| Ok(()))?));
//!     Ok(())
//! });
//!
//! let mut registry = Registry::new(lint.name());
//! lint.register(&mut registry).unwrap();
//! assert_eq!(registry.definitions().len(), 1);
//! ```

use keel_model::error::BuildError;

use crate::registry::Registry;

/// A contributor of tasks, actions, initializers and plugin requirements.
pub trait RegistrationSource: Send + Sync {
    /// Identifier recorded on every executable this source defines.
    fn name(&self) -> &str;

    /// Adds this source's definitions and requirements to `registry`.
    ///
    /// # Errors
    ///
    /// Returns any error raised while building definitions, typically
    /// [`BuildError::InvalidName`].
    fn register(&self, registry: &mut Registry) -> Result<(), BuildError>;
}

impl core::fmt::Debug for dyn RegistrationSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistrationSource")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

type RegisterFn = dyn Fn(&mut Registry) -> Result<(), BuildError> + Send + Sync;

/// A [`RegistrationSource`] backed by a closure.
pub struct FnSource {
    name: String,
    register: Box<RegisterFn>,
}

impl FnSource {
    /// Creates a source named `name` that registers through `register`.
    pub fn new<F>(name: impl Into<String>, register: F) -> Self
    where
        F: Fn(&mut Registry) -> Result<(), BuildError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            register: Box::new(register),
        }
    }
}

impl core::fmt::Debug for FnSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl RegistrationSource for FnSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, registry: &mut Registry) -> Result<(), BuildError> {
        (self.register)(registry)
    }
}
