//! # Keel Internal Library
//!
//! Re-exports the core Keel crates for convenience.

/// Layer 1: Registration model, build context and project.
pub use keel_model;

/// Layer 2: Dependency resolution, planning and execution.
pub use keel_engine;

/// Layer 2: Plugin requirements, registries and resolvers.
pub use keel_plugin;

/// Layer 3: Descriptors, collector and the build reactor.
pub use keel_reactor;

/// Builtin plugins and tracing setup.
pub use keel_core_plugins;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use keel_core_plugins::{CORE_PLUGIN, CorePlugin, TracingFormat, TracingSetup, builtin_plugins};
    pub use keel_engine::prelude::*;
    pub use keel_model::prelude::*;
    pub use keel_plugin::prelude::*;
    pub use keel_reactor::prelude::*;
}
