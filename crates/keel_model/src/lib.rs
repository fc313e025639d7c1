//! The registration model for Keel (Layer 1).
//!
//! `keel_model` defines what plugins and project descriptors contribute to a
//! build and what executables see while it runs:
//!
//! - [`executable`] - Named callables with declared inputs
//! - [`task`] - Named build steps, merged on duplicate registration
//! - [`action`] - Hooks that run before or after tasks
//! - [`initializer`] - Environment-gated setup steps
//! - [`context`] - The typed build context and input projections
//! - [`project`] - Project metadata, properties and expansion
//! - [`error`] - The error taxonomy shared by every layer
//!
//! # Architecture
//!
//! - **Layer 1** (`keel_model`): registration model (this crate)
//! - **Layer 2** (`keel_engine`, `keel_plugin`): execution manager, plugin resolution
//! - **Layer 3** (`keel_reactor`, `keel_core_plugins`): build façade, builtin plugins
//!
//! # Example
//!
//! ```
//! use keel_model::prelude::*;
//!
//! let compile = Task::new(Executable::new("compile", |_| Ok(())).unwrap())
//!     .depends_on("clean");
//! let report = Action::new(Executable::new("report", |_| Ok(())).unwrap())
//!     .after("compile")
//!     .only_once();
//!
//! assert_eq!(compile.dependencies(), ["clean"]);
//! assert!(report.is_only_once());
//! ```

/// Hooks that run before or after tasks.
pub mod action;

/// The typed build context.
pub mod context;

/// Error types.
pub mod error;

/// Named callables.
pub mod executable;

/// Environment-gated setup steps.
pub mod initializer;

/// The identifier rule.
pub mod name;

/// The project under build.
pub mod project;

/// Named build steps.
pub mod task;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::action::*;
    pub use crate::context::*;
    pub use crate::error::*;
    pub use crate::executable::*;
    pub use crate::initializer::*;
    pub use crate::name::*;
    pub use crate::project::*;
    pub use crate::task::*;
}
