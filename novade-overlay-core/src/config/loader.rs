//! Configuration loading.
//!
//! [`ConfigLoader::load()`] reads `overlay.toml` from the NovaDE configuration
//! directory (`$XDG_CONFIG_HOME/NovaDE/NovaDE` on Linux, resolved with
//! `directories-next`). A missing or empty file yields the default
//! configuration. Every loaded configuration is validated before it is
//! returned:
//! - the log level must be one of trace/debug/info/warn/error,
//! - the log format must be text or json.
//!
//! Both values are normalized to lower case.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;

use crate::config::OverlayConfig;
use crate::error::{ConfigError, CoreError};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "NovaDE";
const APPLICATION: &str = "NovaDE";

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "overlay.toml";

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `overlay.toml` from the user configuration directory.
    ///
    /// # Errors
    /// - [`ConfigError::DirectoryUnavailable`] if no home directory can be determined.
    /// - [`ConfigError::ReadError`] for I/O errors other than "not found".
    /// - [`ConfigError::ParseError`] / [`ConfigError::ValidationError`] for bad content.
    pub fn load() -> Result<OverlayConfig, CoreError> {
        let path = Self::default_config_path()?;
        Self::load_from_path(&path)
    }

    /// Path of the per-user configuration file.
    pub fn default_config_path() -> Result<PathBuf, CoreError> {
        let dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
            ConfigError::DirectoryUnavailable {
                dir_type: "application configuration".to_string(),
            }
        })?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads and validates the configuration stored at `path`.
    ///
    /// A file that does not exist yields the default configuration.
    pub fn load_from_path(path: &Path) -> Result<OverlayConfig, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no overlay configuration file, using defaults");
                let mut config = OverlayConfig::default();
                Self::validate_config(&mut config)?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }
            .into()),
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<OverlayConfig, CoreError> {
        let mut config: OverlayConfig = if content.trim().is_empty() {
            OverlayConfig::default()
        } else {
            toml::from_str(content).map_err(ConfigError::ParseError)?
        };
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    fn validate_config(config: &mut OverlayConfig) -> Result<(), CoreError> {
        let level = config.logging.level.to_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}. Must be one of {:?}",
                config.logging.level, VALID_LEVELS
            ))
            .into());
        }
        config.logging.level = level;

        let format = config.logging.format.to_lowercase();
        if !VALID_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log format: {}. Must be one of {:?}",
                config.logging.format, VALID_FORMATS
            ))
            .into());
        }
        config.logging.format = format;

        if let Some(state) = config.engine.initial_state {
            tracing::debug!(%state, "overlay will reset into configured initial state");
        }
        Ok(())
    }
}
