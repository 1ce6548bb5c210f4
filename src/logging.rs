//! Provides `tracing` subscriber setup for the command-line tool.
//!
//! Levels use the instrument logger's names (`CRITICAL`, `ERROR`, `WARNING`,
//! `INFO`, `DEBUG`). `RUST_LOG` overrides the configured level when set.
//!
//! # Examples
//! ```
//! use temscript::logging::level_directive;
//!
//! assert_eq!(level_directive("WARNING"), Some("warn"));
//! assert_eq!(level_directive("TRACE"), None);
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

/// Accepted level names.
pub const LEVELS: [&str; 5] = ["CRITICAL", "ERROR", "WARNING", "INFO", "DEBUG"];

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level name is not one of [`LEVELS`].
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    /// The log file could not be opened.
    #[error("unable to open log file {path}: {source}")]
    File {
        /// Requested log file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A global subscriber is already installed.
    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Maps a level name onto an `EnvFilter` directive.
pub fn level_directive(level: &str) -> Option<&'static str> {
    match level.to_ascii_uppercase().as_str() {
        "CRITICAL" | "ERROR" => Some("error"),
        "WARNING" => Some("warn"),
        "INFO" => Some("info"),
        "DEBUG" => Some("debug"),
        _ => None,
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
/// Fails on an unknown level, an unwritable log file, or if a subscriber is
/// already installed.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let directive =
        level_directive(&config.level).ok_or_else(|| LoggingError::UnknownLevel(config.level.clone()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let console = (!config.quiet).then(|| fmt::layer().with_writer(io::stderr));
    let file = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::File {
                    path: path.clone(),
                    source,
                })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(())
}
