//! Example Keel build: a static site rendered from text pages.
//!
//! The project descriptor requires the `site` plugin, which in turn requires
//! the builtin `core` plugin. Building `package` runs the core lifecycle,
//! renders pages and writes an index.
//!
//! ```text
//! prepare → compile_sources → render_pages → package ─▶ report_site
//!                           → run_unit_tests ─────────┘
//! ```
//!
//! A project directory looks like this:
//!
//! ```text
//! my-site/
//! ├── build.keel        marker file, may be empty
//! └── pages/
//!     ├── about.md
//!     └── news.txt
//! ```

pub mod cli;
mod site;

pub use site::{SITE_PLUGIN, SitePlugin};

use keel::prelude::*;

/// Marker file identifying a project directory.
pub const DESCRIPTOR_FILE: &str = "build.keel";

/// Returns the descriptor of the example site project.
#[must_use]
pub fn site_descriptor() -> FnDescriptor {
    FnDescriptor::new(|registry| {
        registry.use_plugin(SITE_PLUGIN);
        Ok(())
    })
    .with_attributes(
        ProjectAttributes::new()
            .with_version("1.0.0")
            .with_summary("A static site built with Keel")
            .with_default_tasks(["package"]),
    )
}

/// Creates a reactor that builds site projects.
#[must_use]
pub fn site_reactor() -> Reactor {
    let resolvers =
        ResolverChain::new().with(builtin_plugins().with_plugin(SITE_PLUGIN, SitePlugin));
    let loader =
        StaticDescriptorLoader::new(site_descriptor()).with_required_file(DESCRIPTOR_FILE);
    Reactor::new(resolvers, loader)
}
