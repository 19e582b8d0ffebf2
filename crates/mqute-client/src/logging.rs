//! Logging setup over `tracing-subscriber`.
//!
//! Configuration-driven initialization:
//!
//! ```rust,ignore
//! use mqute_client::{config::load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! The `RUST_LOG` environment variable, when set, takes precedence over the
//! configured level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::config::{LogFormat, LoggingConfig};

/// Initializes logging from a [`LoggingConfig`].
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// A builder for configuring the global tracing subscriber.
///
/// # Example
///
/// ```rust,ignore
/// use mqute_client::logging::LoggingBuilder;
///
/// LoggingBuilder::new()
///     .level("debug")
///     .directive("mqute_core=trace")
///     .init();
/// ```
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: String,
    directives: Vec<String>,
    format: LogFormat,
    with_target: bool,
    with_thread_ids: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Creates a builder with compact, info-level output.
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
            directives: Vec::new(),
            format: LogFormat::Compact,
            with_target: true,
            with_thread_ids: false,
        }
    }

    /// Creates a builder mirroring a [`LoggingConfig`].
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            directives: Vec::new(),
            format: config.format,
            with_target: config.with_target,
            with_thread_ids: config.with_thread_ids,
        }
    }

    /// Sets the default log level.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Adds a filter directive such as `"mqute_core=trace"`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Toggles the event target in output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Toggles thread ids in output.
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        // Invalid directives are skipped; there is no subscriber yet to report them to.
        for directive in &self.directives {
            if let Ok(directive) = directive.parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }

    /// Installs the subscriber, failing if one is already set.
    pub fn try_init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_target(self.with_target)
            .with_thread_ids(self.with_thread_ids);

        match self.format {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
        }
    }

    /// Installs the subscriber, ignoring failure if one is already set.
    pub fn init(self) {
        let _ = self.try_init();
    }
}
