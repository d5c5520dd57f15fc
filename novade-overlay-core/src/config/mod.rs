//! Configuration Management for the overlay engine.
//!
//! - [`types`]: the configuration schema ([`OverlayConfig`], [`LoggingConfig`],
//!   [`EngineConfig`]).
//! - [`defaults`]: default values used by `serde` for missing fields.
//! - [`loader`]: [`ConfigLoader`], which reads and validates `overlay.toml`.
//!
//! A missing configuration file is not an error; every field has a default.
//!
//! ```rust,ignore
//! use novade_overlay_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("rollback on init failure: {}", config.engine.rollback_on_init_failure),
//!     Err(e) => {
//!         novade_overlay_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration error: {}", e);
//!     }
//! }
//! ```

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, LoggingConfig, OverlayConfig};
