//! Resolution of plugins already installed on this machine.

use std::sync::Arc;

use hashbrown::HashMap;
use keel_model::error::PluginError;
use parking_lot::RwLock;

use crate::requirement::PluginRequirement;
use crate::resolver::PluginResolver;
use crate::source::RegistrationSource;

/// Loads a registration source from a location.
pub trait PluginLoader: Send + Sync {
    /// Loads the source found at `location`.
    ///
    /// # Errors
    ///
    /// - [`PluginError::NotFound`] if nothing is installed at `location`
    /// - [`PluginError::LoadFailed`] if it exists but cannot be loaded
    fn load(&self, location: &str) -> Result<Arc<dyn RegistrationSource>, PluginError>;
}

/// An in-memory catalog of installed plugins.
///
/// The catalog can be shared (`Arc<StaticPluginLoader>`) between a resolver
/// and whatever installs plugins into it.
#[derive(Default)]
pub struct StaticPluginLoader {
    catalog: RwLock<HashMap<String, Arc<dyn RegistrationSource>>>,
}

impl core::fmt::Debug for StaticPluginLoader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticPluginLoader")
            .field("installed", &self.catalog.read().len())
            .finish()
    }
}

impl StaticPluginLoader {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`install`](Self::install).
    #[must_use]
    pub fn with_plugin(self, location: &str, source: impl RegistrationSource + 'static) -> Self {
        self.install(location, Arc::new(source));
        self
    }

    /// Installs `source` at `location`, replacing what was there.
    pub fn install(&self, location: &str, source: Arc<dyn RegistrationSource>) {
        self.catalog.write().insert(location.to_owned(), source);
    }

    /// Returns `true` if something is installed at `location`.
    #[must_use]
    pub fn contains(&self, location: &str) -> bool {
        self.catalog.read().contains_key(location)
    }
}

impl PluginLoader for StaticPluginLoader {
    fn load(&self, location: &str) -> Result<Arc<dyn RegistrationSource>, PluginError> {
        self.catalog
            .read()
            .get(location)
            .cloned()
            .ok_or_else(|| PluginError::NotFound(location.to_owned()))
    }
}

/// Resolves plugins through a [`PluginLoader`], stripping any third-party
/// prefix from the name first.
#[derive(Clone)]
pub struct InstalledPluginResolver {
    loader: Arc<dyn PluginLoader>,
}

impl core::fmt::Debug for InstalledPluginResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InstalledPluginResolver").finish_non_exhaustive()
    }
}

impl InstalledPluginResolver {
    /// Creates a resolver backed by `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn PluginLoader>) -> Self {
        Self { loader }
    }
}

impl PluginResolver for InstalledPluginResolver {
    fn label(&self) -> &'static str {
        "installed"
    }

    fn resolve(
        &self,
        requirement: &PluginRequirement,
    ) -> Result<Arc<dyn RegistrationSource>, PluginError> {
        self.loader.load(requirement.package())
    }
}
