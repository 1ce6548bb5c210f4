//! Provides the JSON configuration file for the binding tools.
//!
//! The file lives at `<config dir>/CEOS/temscript.json`. A missing file is not
//! an error; every field falls back to its default.
//!
//! # Examples
//! ```
//! use temscript::config::{Backend, Config};
//!
//! let config: Config = serde_json::from_str(r#"{"backend": "simulated"}"#).unwrap();
//! assert_eq!(config.backend, Backend::Simulated);
//! assert!(!config.expose_disabled);
//! assert_eq!(config.log.level, "INFO");
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapter::ExposurePolicy;
use crate::simulated::GunState;

/// Folder below the platform config directory.
pub const CONFIG_FOLDER: &str = "CEOS";
/// Configuration file name.
pub const CONFIG_FILE: &str = "temscript.json";

/// Errors raised while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("unable to access configuration {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("unable to parse configuration {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// No platform configuration directory is known.
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Which native implementation backs the Gun1 handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The in-memory simulated gun.
    Simulated,
    /// The TEMScripting automation server (Windows only).
    Com,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(windows) {
            Self::Com
        } else {
            Self::Simulated
        }
    }
}

/// Logging settings, named after the instrument-side logger levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `CRITICAL`, `ERROR`, `WARNING`, `INFO`, `DEBUG`.
    pub level: String,
    /// Suppresses console output.
    pub quiet: bool,
    /// Optional log file, appended to.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            quiet: false,
            file: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Native backend.
    pub backend: Backend,
    /// Exposes attributes that are disabled on current instruments.
    pub expose_disabled: bool,
    /// Logging settings.
    pub log: LogConfig,
    /// Initial state of the simulated gun.
    pub simulation: GunState,
}

impl Config {
    /// Returns the default configuration file path.
    ///
    /// # Errors
    /// Returns [`ConfigError::NoConfigDir`] if the platform has none.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_FOLDER).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Loads the configuration, returning defaults if the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the configuration, creating the parent folder if needed.
    ///
    /// # Errors
    /// Returns an error if the folder or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(io_err)
    }

    /// Returns the adapter exposure policy this configuration asks for.
    pub fn exposure_policy(&self) -> ExposurePolicy {
        if self.expose_disabled {
            ExposurePolicy::All
        } else {
            ExposurePolicy::EnabledOnly
        }
    }
}
