//! Tracing subscriber setup.
//!
//! Keel logs through the `tracing` crate. Hosts call [`TracingSetup::init`]
//! once at startup to install a subscriber; libraries never install one.
//!
//! # Filter precedence
//!
//! 1. An explicit filter set with [`TracingSetup::with_env_filter`]
//! 2. The `KEEL_LOG` environment variable
//! 3. The configured level
//!
//! # Example
//!
//! ```
//! use keel_core_plugins::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! // Development: pretty output with debug level
//! let dev = TracingSetup::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true);
//!
//! // CI: JSON output, quiet engine internals
//! let ci = TracingSetup::default()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("keel_engine=warn,keel_reactor=info");
//! # let _ = (dev, ci);
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable consulted for a filter when none is set explicitly.
pub const LOG_ENV_VAR: &str = "KEEL_LOG";

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

impl TracingFormat {
    /// Parses `pretty`, `compact` or `json`, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// The tracing configuration a host installed.
///
/// Hosts may insert it into the build context so executables can adapt
/// their own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    /// The configured log level.
    pub level: Level,
    /// The configured output format.
    pub format: TracingFormat,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the process-wide tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "keel_engine=debug").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a setup with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom filter string.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configuration as a context value.
    #[must_use]
    pub fn config(&self) -> TracingConfig {
        TracingConfig {
            level: self.level,
            format: self.format,
        }
    }

    /// Returns the filter directive that [`init`](Self::init) will use.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var(LOG_ENV_VAR).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| self.level.as_str().to_owned())
    }

    /// Installs the subscriber.
    ///
    /// Does nothing if a global subscriber is already installed. An invalid
    /// filter directive falls back to the configured level.
    pub fn init(&self) {
        let directive = self.filter_directive();
        let env_filter =
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init().ok() ignores errors if already initialized
        match self.format {
            TracingFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Compact => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
        }

        tracing::debug!(
            filter = %directive,
            format = ?self.format,
            "tracing initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pretty_at_info() {
        let setup = TracingSetup::default();
        assert_eq!(setup.config(), TracingConfig {
            level: Level::INFO,
            format: TracingFormat::Pretty,
        });
    }

    #[test]
    fn explicit_filter_wins() {
        let setup = TracingSetup::new().with_env_filter("keel_engine=trace");
        assert_eq!(setup.filter_directive(), "keel_engine=trace");
    }

    #[test]
    fn builder_sets_fields() {
        let setup = TracingSetup::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_span_events(true);
        assert_eq!(setup.level, Level::DEBUG);
        assert_eq!(setup.format, TracingFormat::Json);
        assert!(setup.span_events);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!(TracingFormat::parse("JSON"), Some(TracingFormat::Json));
        assert_eq!(TracingFormat::parse("compact"), Some(TracingFormat::Compact));
        assert_eq!(TracingFormat::parse("fancy"), None);
    }

    #[test]
    fn init_twice_is_harmless() {
        TracingSetup::new().with_format(TracingFormat::Compact).init();
        TracingSetup::new().init();
    }
}
