//! A build orchestration engine where plugins contribute tasks, hooks and
//! initializers that run as one deterministic plan.
//!
//! # Example
//!
//! ```
//! use keel::prelude::*;
//!
//! let descriptor = FnDescriptor::new(|registry| {
//!     registry.use_plugin(CORE_PLUGIN);
//!     Ok(())
//! });
//! let mut reactor = Reactor::new(
//!     ResolverChain::new().with(builtin_plugins()),
//!     StaticDescriptorLoader::new(descriptor),
//! );
//! reactor
//!     .prepare_build(Vec::<(String, String)>::new(), std::env::temp_dir())
//!     .unwrap();
//!
//! assert_eq!(
//!     reactor.plan(&["run_unit_tests"]).unwrap(),
//!     ["prepare", "compile_sources", "run_unit_tests"]
//! );
//! ```

pub use keel_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use keel_internal::prelude::*;
}
