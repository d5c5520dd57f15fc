//! # NovaDE Overlay State (`novade-overlay-state`)
//!
//! Moves the overlay hardware between display composition states.
//!
//! - [`StateRegistry`]: the slot layout of every [`CompositionState`] and
//!   factories for holders and rotators wired to it.
//! - [`ResourceHolder`]: owns the opened pipe/rotator pair of each of the four
//!   slots of one state.
//! - [`OverlayState`]: the transition engine. Changes between open states
//!   follow a per-slot [`TransitionPlan`]; the floating slot is always
//!   carried over, content slots are recreated except on the pairs listed in
//!   [`FAST_PATHS`].
//! - [`Overlay`]: keeps the engine together with its current holder and is
//!   what the display-configuration layer talks to.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use novade_overlay_core::{CompositionState, EngineConfig};
//! use novade_overlay_pipes::{OverlayDevice, RecordingDevice};
//! use novade_overlay_state::Overlay;
//!
//! let device: Arc<dyn OverlayDevice> = Arc::new(RecordingDevice::new());
//! let mut overlay = Overlay::new(device, &EngineConfig::default());
//! assert!(overlay.set_state(CompositionState::VideoOnPanel));
//! assert!(overlay.set_state(CompositionState::VideoOnPanelTv));
//! ```
//!
//! [`CompositionState`]: novade_overlay_core::CompositionState

pub mod engine;
pub mod error;
pub mod holder;
pub mod overlay;
pub mod registry;
pub mod transition;

pub use engine::OverlayState;
pub use error::HolderError;
pub use holder::{ResourceHolder, SlotSnapshot};
pub use overlay::{Overlay, SharedOverlay};
pub use registry::{SlotComposition, StateRegistry};
pub use transition::{SlotPolicy, Transition, TransitionPlan, FAST_PATHS};
