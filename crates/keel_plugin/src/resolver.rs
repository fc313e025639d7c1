//! The plugin resolver contract and the fallback chain.

use std::sync::Arc;

use keel_model::error::{BuildError, PluginError};

use crate::requirement::PluginRequirement;
use crate::source::RegistrationSource;

/// Strategy for turning a [`PluginRequirement`] into a registration source.
pub trait PluginResolver: Send + Sync {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    /// Locates and loads the plugin.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] describing why this resolver could not
    /// provide the plugin.
    fn resolve(
        &self,
        requirement: &PluginRequirement,
    ) -> Result<Arc<dyn RegistrationSource>, PluginError>;
}

/// Tries resolvers in order and returns the first success.
///
/// The chain keeps no state between calls; deduplicating requirements is the
/// caller's job.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn PluginResolver>>,
}

impl core::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let labels: Vec<_> = self.resolvers.iter().map(|r| r.label()).collect();
        f.debug_struct("ResolverChain")
            .field("resolvers", &labels)
            .finish()
    }
}

impl ResolverChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver to the end of the chain.
    #[must_use]
    pub fn with(mut self, resolver: impl PluginResolver + 'static) -> Self {
        self.push(resolver);
        self
    }

    /// In-place variant of [`with`](Self::with).
    pub fn push(&mut self, resolver: impl PluginResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Returns the number of resolvers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns `true` if the chain has no resolvers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolves `requirement` through each resolver in turn.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingPlugin`] if every resolver fails, with
    /// the last failure as its cause. An empty chain reports
    /// [`PluginError::NotFound`].
    pub fn resolve(
        &self,
        requirement: &PluginRequirement,
    ) -> Result<Arc<dyn RegistrationSource>, BuildError> {
        let mut last_failure = None;

        for resolver in &self.resolvers {
            match resolver.resolve(requirement) {
                Ok(source) => {
                    tracing::debug!(
                        plugin = %requirement,
                        resolver = resolver.label(),
                        "plugin resolved"
                    );
                    return Ok(source);
                }
                Err(err) => {
                    tracing::debug!(
                        plugin = %requirement,
                        resolver = resolver.label(),
                        error = %err,
                        "resolver failed"
                    );
                    last_failure = Some(err);
                }
            }
        }

        Err(BuildError::MissingPlugin {
            name: requirement.name().to_owned(),
            cause: last_failure
                .unwrap_or_else(|| PluginError::NotFound(requirement.name().to_owned())),
        })
    }
}
