//! Core data types of the overlay engine.
//!
//! - [`state`]: the closed set of [`CompositionState`]s.
//! - [`roles`]: slot addressing and the pipe/rotator role of every slot.
//! - [`transform`]: parameters handed to a rotator when it is opened.

pub mod roles;
pub mod state;
pub mod transform;

pub use roles::{DisplayTarget, PipeRole, RotatorRole, SlotIndex, SlotRole, StereoChannel, SLOT_COUNT};
pub use state::CompositionState;
pub use transform::{RotatorParams, Transform};
