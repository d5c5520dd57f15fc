//! Error handling for the overlay core layer.
//!
//! The main error type of this crate is [`CoreError`], which wraps the more
//! specific [`ConfigError`] and [`LoggingError`]. Errors of the pipe and
//! state crates live next to the code that raises them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for the overlay crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while installing the global `tracing` subscriber.
    #[error("Logging Error: {0}")]
    Logging(#[from] LoggingError),

    /// Filesystem errors that are not tied to a configuration file,
    /// e.g. creating the directory of a log file.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors due to invalid input provided to a function or method.
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
}

/// Error type for configuration-related operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed values are out of range (unknown log level, unknown format...).
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// The per-user configuration directory could not be determined.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}

/// Error type for logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// The configured level or filter directive is not understood.
    #[error("Failed to set log filter: {0}")]
    FilterError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn config_error_is_wrapped_with_source() {
        let core_err = CoreError::from(ConfigError::ValidationError("bad level".to_string()));

        assert_eq!(
            core_err.to_string(),
            "Configuration Error: Configuration validation failed: bad level"
        );
        match core_err.source().and_then(|s| s.downcast_ref::<ConfigError>()) {
            Some(ConfigError::ValidationError(msg)) => assert_eq!(msg, "bad level"),
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn logging_error_display() {
        let core_err = CoreError::from(LoggingError::FilterError("loud".to_string()));
        assert_eq!(core_err.to_string(), "Logging Error: Failed to set log filter: loud");
    }

    #[test]
    fn filesystem_error_keeps_io_source() {
        let path = PathBuf::from("/var/log/overlay");
        let core_err = CoreError::Filesystem {
            message: "cannot create log directory".to_string(),
            path: path.clone(),
            source: IoError::new(ErrorKind::PermissionDenied, "denied"),
        };

        assert_eq!(
            core_err.to_string(),
            format!("Filesystem Error: cannot create log directory (Path: {:?})", path)
        );
        let source = core_err.source().and_then(|s| s.downcast_ref::<IoError>());
        assert_eq!(source.map(|e| e.kind()), Some(ErrorKind::PermissionDenied));
    }

    #[test]
    fn read_error_display_mentions_path() {
        let err = ConfigError::ReadError {
            path: PathBuf::from("overlay.toml"),
            source: IoError::new(ErrorKind::Other, "boom"),
        };
        assert_eq!(err.to_string(), "Failed to read configuration file from \"overlay.toml\"");
        assert!(err.source().is_some());
    }
}
