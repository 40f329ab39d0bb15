//! Configuration management.
//!
//! Settings come from, in increasing priority: built-in defaults, a TOML
//! file, and `NESTLIST_*` environment variables.
//!
//! ```toml
//! database_path = "/var/lib/nestlist/lists.db"
//! table = "cards"
//!
//! [logging]
//! format = "json"
//! file = "/var/log/nestlist.log"
//! filter = "nestlist=debug"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "NESTLIST_DATABASE";

/// Environment variable overriding the table name.
pub const TABLE_ENV: &str = "NESTLIST_TABLE";

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "nodes";

/// Main configuration for nestlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestlistConfig {
    /// Path to the `SQLite` database file.
    pub database_path: PathBuf,
    /// Table holding the list rows.
    pub table: String,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// `"pretty"` or `"json"`.
    pub format: Option<String>,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `"nestlist=debug"`.
    pub filter: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Database path.
    pub database_path: Option<String>,
    /// Table name.
    pub table: Option<String>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

impl Default for NestlistConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            table: DEFAULT_TABLE.to_string(),
            logging: LoggingSettings::default(),
        }
    }
}

impl NestlistConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/nestlist/` on macOS)
    /// 2. XDG config dir (`~/.config/nestlist/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("nestlist").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("nestlist")
                .join("config.toml"),
        ];
        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        Self::default()
    }

    /// Applies `NESTLIST_DATABASE` and `NESTLIST_TABLE` from the process
    /// environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, which maps an environment
    /// variable name to its value. Empty values are ignored.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(table) = lookup(TABLE_ENV).filter(|v| !v.is_empty()) {
            self.table = table;
        }
        self
    }

    /// Converts a `ConfigFile` to `NestlistConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(path) = file.database_path {
            config.database_path = PathBuf::from(path);
        }
        if let Some(table) = file.table {
            config.table = table;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Sets the table name.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Sets the logging settings.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingSettings) -> Self {
        self.logging = logging;
        self
    }
}

/// `nestlist.db` in the user data directory, or in the working directory
/// when no home directory is known.
fn default_database_path() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("nestlist.db"),
        |dirs| dirs.data_dir().join("nestlist").join("nestlist.db"),
    )
}
