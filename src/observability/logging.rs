//! Structured logging configuration.

use crate::config::LoggingSettings;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "NESTLIST_LOG";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name. Anything other than `json` is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when `None`.
    pub file: Option<std::path::PathBuf>,
    /// `EnvFilter` directive.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            file: None,
            filter: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Builds the logging configuration from file settings, the `--verbose`
    /// flag and `NESTLIST_LOG`.
    ///
    /// The filter is taken from the first of: `NESTLIST_LOG`, `debug` when
    /// verbose, the file setting, `info`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, std::env::var(LOG_ENV).ok())
    }

    fn resolve(settings: Option<&LoggingSettings>, verbose: bool, env_filter: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(settings) = settings {
            if let Some(format) = settings.format.as_deref() {
                config.format = LogFormat::parse(format);
            }
            config.file.clone_from(&settings.file);
            if let Some(filter) = settings.filter.as_ref() {
                config.filter.clone_from(filter);
            }
        }
        if verbose {
            config.filter = "debug".to_string();
        }
        if let Some(filter) = env_filter.filter(|f| !f.trim().is_empty()) {
            config.filter = filter;
        }
        config
    }
}
