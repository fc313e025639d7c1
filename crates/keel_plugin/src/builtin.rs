//! Resolution of plugins shipped with Keel.

use std::sync::Arc;

use hashbrown::HashMap;
use keel_model::error::PluginError;

use crate::requirement::{PluginOrigin, PluginRequirement};
use crate::resolver::PluginResolver;
use crate::source::RegistrationSource;

/// Namespace builtin plugin names are qualified with.
pub const BUILTIN_NAMESPACE: &str = "keel.plugins";

/// Returns the namespaced location of the builtin plugin `name`.
#[must_use]
pub fn qualified_name(name: &str) -> String {
    format!("{BUILTIN_NAMESPACE}.{name}")
}

/// Resolves bare plugin names against a table of builtin sources.
///
/// Names carrying the third-party prefix are rejected with
/// [`PluginError::UnsupportedOrigin`] so the chain moves on.
#[derive(Default, Clone)]
pub struct BuiltinPluginResolver {
    table: HashMap<String, Arc<dyn RegistrationSource>>,
}

impl core::fmt::Debug for BuiltinPluginResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: Vec<_> = self.table.keys().collect();
        names.sort();
        f.debug_struct("BuiltinPluginResolver")
            .field("plugins", &names)
            .finish()
    }
}

impl BuiltinPluginResolver {
    /// Creates a resolver with an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the builtin plugin `name`.
    #[must_use]
    pub fn with_plugin(mut self, name: &str, source: impl RegistrationSource + 'static) -> Self {
        self.insert(name, Arc::new(source));
        self
    }

    /// Adds or replaces the builtin plugin `name`.
    pub fn insert(&mut self, name: &str, source: Arc<dyn RegistrationSource>) {
        self.table.insert(qualified_name(name), source);
    }

    /// Returns `true` if `name` is a known builtin plugin.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(&qualified_name(name))
    }
}

impl PluginResolver for BuiltinPluginResolver {
    fn label(&self) -> &'static str {
        "builtin"
    }

    fn resolve(
        &self,
        requirement: &PluginRequirement,
    ) -> Result<Arc<dyn RegistrationSource>, PluginError> {
        if requirement.origin() == PluginOrigin::ThirdParty {
            return Err(PluginError::UnsupportedOrigin(requirement.name().to_owned()));
        }

        let location = qualified_name(requirement.name());
        self.table
            .get(&location)
            .cloned()
            .ok_or(PluginError::NotFound(location))
    }
}
