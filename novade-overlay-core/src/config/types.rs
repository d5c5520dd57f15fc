//! Configuration data structures.
//!
//! All structs apply defaults from [`super::defaults`] for missing fields and
//! reject unknown fields.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults;
use crate::types::CompositionState;

/// Configuration settings for the logging subsystem.
///
/// ```
/// use novade_overlay_core::config::LoggingConfig;
///
/// let config: LoggingConfig = toml::from_str(r#"level = "debug""#).unwrap();
/// assert_eq!(config.level, "debug");
/// assert_eq!(config.format, "text");
/// assert_eq!(config.file_path, None);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level: "trace", "debug", "info", "warn" or "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the working directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Behaviour switches of the transition engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// When opening a state from `Closed` fails, record `Closed` instead of
    /// the requested state. Off by default: the requested state is recorded
    /// and the caller observes the missing holder.
    #[serde(default = "defaults::default_rollback_on_init_failure")]
    pub rollback_on_init_failure: bool,
    /// State the overlay is reset into when it is created.
    #[serde(default = "defaults::default_initial_state")]
    pub initial_state: Option<CompositionState>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        defaults::default_engine_config()
    }
}

/// Root configuration of the overlay crates.
///
/// ```
/// use novade_overlay_core::config::OverlayConfig;
/// use novade_overlay_core::CompositionState;
///
/// let config: OverlayConfig = toml::from_str(r#"
/// [engine]
/// initial_state = "fb"
/// "#).unwrap();
/// assert_eq!(config.engine.initial_state, Some(CompositionState::FramebufferOnly));
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_engine_config")]
    pub engine: EngineConfig,
}
