//! Project descriptors and how they are loaded.
//!
//! A project descriptor is the registration source that belongs to the
//! project itself. Besides tasks and plugin requirements it carries
//! [`ProjectAttributes`], a fixed whitelist of project-level settings copied
//! onto the [`Project`] during preparation.

use std::path::Path;
use std::sync::Arc;

use keel_model::error::BuildError;
use keel_model::project::Project;
use keel_plugin::registry::Registry;
use keel_plugin::source::{FnSource, RegistrationSource};

/// Source name recorded on executables defined by the project descriptor.
pub const DESCRIPTOR_SOURCE: &str = "project";

// ─────────────────────────────────────────────────────────────────────────────
// ProjectAttributes
// ─────────────────────────────────────────────────────────────────────────────

/// Descriptor-level project settings. Unset fields leave the project as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectAttributes {
    /// Project name.
    pub name: Option<String>,
    /// Project version.
    pub version: Option<String>,
    /// Tasks built when none are requested.
    pub default_tasks: Option<Vec<String>>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Project authors.
    pub authors: Option<Vec<String>>,
    /// License identifier.
    pub license: Option<String>,
    /// Project home page.
    pub url: Option<String>,
}

impl ProjectAttributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the project version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the default tasks.
    #[must_use]
    pub fn with_default_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_tasks = Some(tasks.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.get_or_insert_with(Vec::new).push(author.into());
        self
    }

    /// Sets the license.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Sets the home page.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Copies every set attribute onto `project`.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name.clone_from(name);
        }
        if let Some(version) = &self.version {
            project.version.clone_from(version);
        }
        if let Some(tasks) = &self.default_tasks {
            project.default_tasks.clone_from(tasks);
        }
        if let Some(authors) = &self.authors {
            project.authors.clone_from(authors);
        }
        if self.summary.is_some() {
            project.summary.clone_from(&self.summary);
        }
        if self.description.is_some() {
            project.description.clone_from(&self.description);
        }
        if self.license.is_some() {
            project.license.clone_from(&self.license);
        }
        if self.url.is_some() {
            project.url.clone_from(&self.url);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProjectDescriptor
// ─────────────────────────────────────────────────────────────────────────────

/// The registration source describing the project itself.
pub trait ProjectDescriptor: RegistrationSource {
    /// Project-level attributes declared by the descriptor.
    fn attributes(&self) -> ProjectAttributes;
}

/// A [`ProjectDescriptor`] backed by a closure and a fixed attribute set.
///
/// # Example
///
/// ```
/// use keel_model::prelude::*;
/// use keel_reactor::descriptor::{FnDescriptor, ProjectAttributes};
///
/// let descriptor = FnDescriptor::new(|registry| {
///     registry.use_plugin("core");
///     registry.task(Task::new(Executable::new("lint", |_| Ok(()))?).depends_on("prepare"));
///     Ok(())
/// })
/// .with_attributes(
///     ProjectAttributes::new()
///         .with_name("demo")
///         .with_default_tasks(["lint"]),
/// );
/// # let _ = descriptor;
/// ```
#[derive(Debug)]
pub struct FnDescriptor {
    source: FnSource,
    attributes: ProjectAttributes,
}

impl FnDescriptor {
    /// Creates a descriptor that registers through `register`.
    pub fn new<F>(register: F) -> Self
    where
        F: Fn(&mut Registry) -> Result<(), BuildError> + Send + Sync + 'static,
    {
        Self {
            source: FnSource::new(DESCRIPTOR_SOURCE, register),
            attributes: ProjectAttributes::default(),
        }
    }

    /// Sets the descriptor's project attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ProjectAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl RegistrationSource for FnDescriptor {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn register(&self, registry: &mut Registry) -> Result<(), BuildError> {
        self.source.register(registry)
    }
}

impl ProjectDescriptor for FnDescriptor {
    fn attributes(&self) -> ProjectAttributes {
        self.attributes.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DescriptorLoader
// ─────────────────────────────────────────────────────────────────────────────

/// Loads the descriptor of the project in a directory.
pub trait DescriptorLoader: Send + Sync {
    /// Loads the descriptor for the project rooted at `project_directory`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DescriptorLoad`] if no usable descriptor exists.
    fn load(&self, project_directory: &Path) -> Result<Arc<dyn ProjectDescriptor>, BuildError>;
}

/// Returns the same descriptor for every directory.
///
/// Optionally requires a marker file to exist in the project directory, so
/// a directory that is not a project is rejected.
#[derive(Clone)]
pub struct StaticDescriptorLoader {
    descriptor: Arc<dyn ProjectDescriptor>,
    required_file: Option<String>,
}

impl core::fmt::Debug for StaticDescriptorLoader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticDescriptorLoader")
            .field("required_file", &self.required_file)
            .finish_non_exhaustive()
    }
}

impl StaticDescriptorLoader {
    /// Creates a loader returning `descriptor`.
    pub fn new(descriptor: impl ProjectDescriptor + 'static) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            required_file: None,
        }
    }

    /// Requires `file_name` to exist in the project directory.
    #[must_use]
    pub fn with_required_file(mut self, file_name: impl Into<String>) -> Self {
        self.required_file = Some(file_name.into());
        self
    }
}

impl DescriptorLoader for StaticDescriptorLoader {
    fn load(&self, project_directory: &Path) -> Result<Arc<dyn ProjectDescriptor>, BuildError> {
        if let Some(file_name) = &self.required_file {
            let marker = project_directory.join(file_name);
            if !marker.is_file() {
                return Err(BuildError::DescriptorLoad(
                    format!("no project descriptor found at {}", marker.display()).into(),
                ));
            }
        }
        Ok(Arc::clone(&self.descriptor))
    }
}
