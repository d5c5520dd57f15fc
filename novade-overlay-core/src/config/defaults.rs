//! Default configuration values.
//!
//! These functions are referenced from `#[serde(default = ...)]` attributes so
//! that partial configuration files fill the gaps with the same values as
//! `Default::default()`.

use crate::config::{EngineConfig, LoggingConfig};
use crate::types::CompositionState;
use std::path::PathBuf;

/// Returns the default `LoggingConfig`.
pub(crate) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// Returns the default log level string (`"info"`).
pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

/// Returns the default log file path (`None`, no file logging).
pub(crate) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// Returns the default log format string (`"text"`).
pub(crate) fn default_log_format() -> String {
    "text".to_string()
}

/// Returns the default `EngineConfig`.
pub(crate) fn default_engine_config() -> EngineConfig {
    EngineConfig {
        rollback_on_init_failure: default_rollback_on_init_failure(),
        initial_state: default_initial_state(),
    }
}

/// The engine keeps the target state when opening it fails.
pub(crate) fn default_rollback_on_init_failure() -> bool {
    false
}

pub(crate) fn default_initial_state() -> Option<CompositionState> {
    None
}
