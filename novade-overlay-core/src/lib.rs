//! # NovaDE Overlay Core (`novade-overlay-core`)
//!
//! `novade-overlay-core` is the foundation shared by the overlay crates of NovaDE.
//! It holds the vocabulary used to describe display composition states and the
//! ambient services every overlay component relies on.
//!
//! ## Contents
//!
//! - **Types**: the closed set of [`CompositionState`]s, the per-slot roles
//!   ([`PipeRole`], [`RotatorRole`], [`SlotRole`]) and the [`SlotIndex`] type
//!   addressing the four fixed resource slots.
//! - **Error Handling**: [`CoreError`] with the more specific [`ConfigError`]
//!   and [`LoggingError`].
//! - **Configuration**: [`OverlayConfig`] loaded from TOML through
//!   [`ConfigLoader`].
//! - **Logging**: `tracing` based setup, see [`init_logging`] and
//!   [`init_minimal_logging`].
//!
//! ```rust,ignore
//! use novade_overlay_core::{ConfigLoader, init_logging};
//!
//! let config = ConfigLoader::load()?;
//! init_logging(&config.logging, false)?;
//! tracing::info!(initial = ?config.engine.initial_state, "overlay core ready");
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export key types for convenience
pub use config::{ConfigLoader, EngineConfig, LoggingConfig, OverlayConfig};
pub use error::{ConfigError, CoreError, LoggingError};
pub use logging::{init_logging, init_minimal_logging};
pub use types::{
    CompositionState, DisplayTarget, PipeRole, RotatorParams, RotatorRole, SlotIndex, SlotRole,
    StereoChannel, Transform, SLOT_COUNT,
};
