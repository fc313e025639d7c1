//! The execution manager for Keel (Layer 2).
//!
//! `keel_engine` turns registered definitions into something that runs:
//!
//! - [`manager`] - Registration, dependency resolution, planning and execution
//! - [`plan`] - Ordered, cycle-free task sequences
//! - [`summary`] - Per-task results and plan abort reporting
//!
//! Execution is single threaded and follows the total order of the plan.

/// Registration, resolution, planning and execution.
pub mod manager;

/// Execution plans.
pub mod plan;

/// Execution summaries.
pub mod summary;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::manager::*;
    pub use crate::plan::*;
    pub use crate::summary::*;
}
