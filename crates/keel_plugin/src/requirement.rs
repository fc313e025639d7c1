//! Plugin requirements and origins.

use core::fmt;

/// Prefix marking a plugin as third-party.
pub const THIRD_PARTY_PREFIX: &str = "pkg:";

/// Where a plugin comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginOrigin {
    /// Shipped with Keel and looked up in the builtin namespace.
    Builtin,
    /// Named with the [`THIRD_PARTY_PREFIX`]; installed or fetched on demand.
    ThirdParty,
}

/// A request to load a plugin, optionally pinned to a version.
///
/// # Example
///
/// ```
/// use keel_plugin::requirement::{PluginOrigin, PluginRequirement};
///
/// let req = PluginRequirement::new("pkg:keel_docs").with_version("1.2");
/// assert_eq!(req.origin(), PluginOrigin::ThirdParty);
/// assert_eq!(req.package(), "keel_docs");
/// assert_eq!(req.to_string(), "pkg:keel_docs@1.2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginRequirement {
    name: String,
    version: Option<String>,
}

impl PluginRequirement {
    /// Creates an unversioned requirement.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Pins the requirement to `version`.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Returns the name as requested, including any origin prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the pinned version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns where the plugin comes from.
    #[must_use]
    pub fn origin(&self) -> PluginOrigin {
        if self.name.starts_with(THIRD_PARTY_PREFIX) {
            PluginOrigin::ThirdParty
        } else {
            PluginOrigin::Builtin
        }
    }

    /// Returns the name with any origin prefix removed.
    #[must_use]
    pub fn package(&self) -> &str {
        self.name
            .strip_prefix(THIRD_PARTY_PREFIX)
            .unwrap_or(&self.name)
    }
}

impl fmt::Display for PluginRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{version}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
