//! The build reactor for Keel (Layer 3).
//!
//! - [`descriptor`] - Project descriptors, attributes and descriptor loaders
//! - [`collector`] - Collection of definitions from registration sources
//! - [`reactor`] - The [`Reactor`](reactor::Reactor) façade driving a build
//! - [`summary`] - Build summaries and task listings

/// Definition collection.
pub mod collector;

/// Project descriptors.
pub mod descriptor;

/// The build reactor.
pub mod reactor;

/// Build summaries.
pub mod summary;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::collector::*;
    pub use crate::descriptor::*;
    pub use crate::reactor::*;
    pub use crate::summary::*;
}
