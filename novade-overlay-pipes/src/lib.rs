//! # Novade Overlay Pipes
//!
//! This crate wraps the display driver's overlay hardware behind two small
//! capabilities:
//! - [`Pipe`]: an overlay data path bound to one display layer
//!   (open, close, enqueue a buffer).
//! - [`Rotator`]: an optional pre-rotation stage feeding a pipe
//!   (open with transform parameters, close).
//!
//! Every role of `novade_overlay_core::PipeRole` is served by [`HwPipe`]
//! except the placeholder role, which is served by [`NullPipe`] and never
//! touches the hardware. The driver itself is reached through the
//! [`OverlayDevice`] trait; [`RecordingDevice`] is an in-memory device used
//! for dry runs and tests.

pub mod device;
pub mod error;
pub mod id;
pub mod pipe;
pub mod rotator;

// Re-export key types for convenience.
pub use device::{DeviceEvent, OverlayDevice, PipeFlags, PipeSpec, RecordingDevice};
pub use error::PipeError;
pub use id::ResourceId;
pub use pipe::{create_pipe, BufferHandle, HwPipe, NullPipe, Pipe};
pub use rotator::{create_rotator, HwRotator, NullRotator, Rotator};
