//! Resolution of third-party plugins that must be acquired first.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use keel_model::error::PluginError;

use crate::installed::{InstalledPluginResolver, PluginLoader};
use crate::requirement::{PluginOrigin, PluginRequirement};
use crate::resolver::PluginResolver;
use crate::source::RegistrationSource;

/// The external acquisition step for a third-party plugin.
pub trait PluginFetcher: Send + Sync {
    /// Makes the plugin for `requirement` available to the loader.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::FetchFailed`] if acquisition fails.
    fn fetch(&self, requirement: &PluginRequirement) -> Result<(), PluginError>;
}

/// Fetches plugins by running an external command.
///
/// The command is invoked as `program args... <package>[@<version>]`.
///
/// # Example
///
/// ```
/// use keel_plugin::fetch::CommandFetcher;
///
/// let fetcher = CommandFetcher::new("keel-pkg").with_arg("install");
/// assert_eq!(fetcher.program(), "keel-pkg");
/// ```
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandFetcher {
    /// Creates a fetcher that runs `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Appends an argument placed before the package specifier.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments placed before the package specifier.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the command in `dir`.
    #[must_use]
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the specifier passed as the final argument.
    #[must_use]
    pub fn specifier(requirement: &PluginRequirement) -> String {
        match requirement.version() {
            Some(version) => format!("{}@{version}", requirement.package()),
            None => requirement.package().to_owned(),
        }
    }
}

impl PluginFetcher for CommandFetcher {
    fn fetch(&self, requirement: &PluginRequirement) -> Result<(), PluginError> {
        let specifier = Self::specifier(requirement);
        tracing::info!(program = %self.program, package = %specifier, "fetching plugin");

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(&specifier);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|err| PluginError::FetchFailed {
            name: specifier.clone(),
            message: format!("failed to run '{}': {err}", self.program),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                tracing::debug!(stderr = %stderr, "fetch command stderr");
            }
            return Err(PluginError::FetchFailed {
                name: specifier,
                message: format!("'{}' exited with {}", self.program, output.status),
            });
        }

        Ok(())
    }
}

/// Fetches third-party plugins, then loads them like installed ones.
///
/// Bare (builtin) names are rejected with [`PluginError::UnsupportedOrigin`].
#[derive(Clone)]
pub struct FetchingPluginResolver {
    fetcher: Arc<dyn PluginFetcher>,
    installed: InstalledPluginResolver,
}

impl core::fmt::Debug for FetchingPluginResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FetchingPluginResolver")
            .finish_non_exhaustive()
    }
}

impl FetchingPluginResolver {
    /// Creates a resolver that fetches with `fetcher` and loads with `loader`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PluginFetcher>, loader: Arc<dyn PluginLoader>) -> Self {
        Self {
            fetcher,
            installed: InstalledPluginResolver::new(loader),
        }
    }
}

impl PluginResolver for FetchingPluginResolver {
    fn label(&self) -> &'static str {
        "fetching"
    }

    fn resolve(
        &self,
        requirement: &PluginRequirement,
    ) -> Result<Arc<dyn RegistrationSource>, PluginError> {
        if requirement.origin() != PluginOrigin::ThirdParty {
            return Err(PluginError::UnsupportedOrigin(requirement.name().to_owned()));
        }

        self.fetcher.fetch(requirement)?;
        self.installed.resolve(requirement)
    }
}
