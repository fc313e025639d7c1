//! Builtin plugins and infrastructure for Keel.
//!
//! - [`CorePlugin`] - Standard directories and the build lifecycle tasks
//! - [`builtin_plugins`] - Resolver table holding every builtin plugin
//! - [`TracingSetup`] - Logging via the `tracing` crate
//!
//! # Example
//!
//! ```
//! use keel_core_plugins::{TracingSetup, builtin_plugins};
//! use keel_plugin::resolver::ResolverChain;
//! use tracing::Level;
//!
//! TracingSetup::default().with_level(Level::WARN).init();
//!
//! let chain = ResolverChain::new().with(builtin_plugins());
//! assert_eq!(chain.len(), 1);
//! ```

mod builtin;
mod lifecycle;
mod tracing_setup;

pub use builtin::builtin_plugins;
pub use lifecycle::{CORE_PLUGIN, CorePlugin};
pub use tracing_setup::{LOG_ENV_VAR, TracingConfig, TracingFormat, TracingSetup};
