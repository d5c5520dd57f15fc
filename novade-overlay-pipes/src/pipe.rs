//! Pipe capability and its variants.
//!
//! [`NullPipe`] serves the placeholder role of unused slots. Every other role
//! is an [`HwPipe`] whose behaviour is fully described by its [`PipeSpec`].

use std::fmt;
use std::sync::Arc;

use novade_overlay_core::{PipeRole, RotatorParams, RotatorRole};
use tracing::trace;

use crate::device::{OverlayDevice, PipeSpec};
use crate::error::PipeError;
use crate::id::ResourceId;
use crate::rotator::Rotator;

/// A client buffer handed to a pipe for scan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

impl BufferHandle {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

/// Hardware overlay data path bound to one display layer.
pub trait Pipe: fmt::Debug + Send {
    fn id(&self) -> ResourceId;
    fn role(&self) -> PipeRole;

    /// Opens the pipe with `rotator` in front of it.
    ///
    /// An active rotator that is still closed gets opened with default
    /// parameters first.
    fn open(&mut self, rotator: &mut dyn Rotator) -> Result<(), PipeError>;
    fn close(&mut self) -> Result<(), PipeError>;
    fn is_open(&self) -> bool;
    fn queue_buffer(&mut self, buffer: &BufferHandle) -> Result<(), PipeError>;
}

/// Placeholder pipe; all operations succeed without hardware.
#[derive(Debug)]
pub struct NullPipe {
    id: ResourceId,
    open: bool,
}

impl NullPipe {
    pub fn new() -> Self {
        Self {
            id: ResourceId::new_unique(),
            open: false,
        }
    }
}

impl Default for NullPipe {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipe for NullPipe {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn role(&self) -> PipeRole {
        PipeRole::None
    }

    fn open(&mut self, _rotator: &mut dyn Rotator) -> Result<(), PipeError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn queue_buffer(&mut self, _buffer: &BufferHandle) -> Result<(), PipeError> {
        Ok(())
    }
}

/// Pipe backed by the overlay device.
pub struct HwPipe {
    id: ResourceId,
    spec: PipeSpec,
    device: Arc<dyn OverlayDevice>,
    open: bool,
}

impl HwPipe {
    pub fn new(spec: PipeSpec, device: Arc<dyn OverlayDevice>) -> Self {
        Self {
            id: ResourceId::new_unique(),
            spec,
            device,
            open: false,
        }
    }

    pub fn spec(&self) -> &PipeSpec {
        &self.spec
    }
}

impl fmt::Debug for HwPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HwPipe")
            .field("id", &self.id)
            .field("spec", &self.spec)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl Pipe for HwPipe {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn role(&self) -> PipeRole {
        self.spec.role
    }

    fn open(&mut self, rotator: &mut dyn Rotator) -> Result<(), PipeError> {
        if self.open {
            return Ok(());
        }

        let rotated = rotator.role() == RotatorRole::Active;
        let opened_rotator = rotated && !rotator.is_open();
        if opened_rotator {
            rotator.open(&RotatorParams::default())?;
        }

        let spec = if rotated { self.spec.rotated() } else { self.spec };
        if let Err(e) = self.device.open_pipe(self.id, &spec) {
            if opened_rotator {
                if let Err(close_err) = rotator.close() {
                    trace!("rotator {} close after failed pipe open: {}", rotator.id(), close_err);
                }
            }
            return Err(e);
        }

        trace!("pipe {} ({}) opened", self.id, self.spec.role);
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipeError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        trace!("pipe {} ({}) closing", self.id, self.spec.role);
        self.device.close_pipe(self.id)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn queue_buffer(&mut self, buffer: &BufferHandle) -> Result<(), PipeError> {
        if !self.open {
            return Err(PipeError::NotOpen(self.id));
        }
        self.device.queue_buffer(self.id, buffer)
    }
}

/// Builds the pipe variant serving `role`.
pub fn create_pipe(role: PipeRole, device: &Arc<dyn OverlayDevice>) -> Box<dyn Pipe> {
    match PipeSpec::for_role(role) {
        Some(spec) => Box::new(HwPipe::new(spec, Arc::clone(device))),
        None => Box::new(NullPipe::new()),
    }
}
