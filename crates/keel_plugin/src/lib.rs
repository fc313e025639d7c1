//! Registration sources and plugin resolution for Keel (Layer 2).
//!
//! - [`source`] - The [`RegistrationSource`](source::RegistrationSource) contract
//! - [`registry`] - Staging collection a source registers into
//! - [`requirement`] - Plugin requirements and origins
//! - [`resolver`] - The resolver contract and the fallback [`ResolverChain`](resolver::ResolverChain)
//! - [`builtin`] - Plugins shipped with Keel
//! - [`installed`] - Plugins already installed, via a [`PluginLoader`](installed::PluginLoader)
//! - [`fetch`] - Third-party plugins acquired on demand
//!
//! A typical chain tries builtin plugins first, then installed ones, then
//! fetches:
//!
//! ```
//! use std::sync::Arc;
//!
//! use keel_plugin::prelude::*;
//!
//! let loader = Arc::new(StaticPluginLoader::new());
//! let chain = ResolverChain::new()
//!     .with(BuiltinPluginResolver::new())
//!     .with(InstalledPluginResolver::new(loader.clone()))
//!     .with(FetchingPluginResolver::new(
//!         Arc::new(CommandFetcher::new("keel-pkg").with_arg("install")),
//!         loader,
//!     ));
//!
//! assert_eq!(chain.len(), 3);
//! ```

/// Builtin plugin resolution.
pub mod builtin;

/// Fetch-then-load resolution.
pub mod fetch;

/// Installed plugin resolution.
pub mod installed;

/// Staging registry.
pub mod registry;

/// Plugin requirements.
pub mod requirement;

/// Resolver contract and chain.
pub mod resolver;

/// Registration sources.
pub mod source;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::builtin::*;
    pub use crate::fetch::*;
    pub use crate::installed::*;
    pub use crate::registry::*;
    pub use crate::requirement::*;
    pub use crate::resolver::*;
    pub use crate::source::*;
}
