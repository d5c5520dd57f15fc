//! Rotator capability and its two variants.

use std::fmt;
use std::sync::Arc;

use novade_overlay_core::{RotatorParams, RotatorRole};
use tracing::trace;

use crate::device::OverlayDevice;
use crate::error::PipeError;
use crate::id::ResourceId;

/// Optional pre-rotation stage feeding a pipe.
pub trait Rotator: fmt::Debug + Send {
    fn id(&self) -> ResourceId;
    fn role(&self) -> RotatorRole;

    /// Opens the rotator, or reconfigures it when it is already open.
    fn open(&mut self, params: &RotatorParams) -> Result<(), PipeError>;
    fn close(&mut self) -> Result<(), PipeError>;
    fn is_open(&self) -> bool;

    /// Parameters of the current session, `None` while closed.
    fn params(&self) -> Option<RotatorParams>;
}

/// Pass-through rotator; never touches the device.
#[derive(Debug)]
pub struct NullRotator {
    id: ResourceId,
    params: Option<RotatorParams>,
}

impl NullRotator {
    pub fn new() -> Self {
        Self {
            id: ResourceId::new_unique(),
            params: None,
        }
    }
}

impl Default for NullRotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Rotator for NullRotator {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn role(&self) -> RotatorRole {
        RotatorRole::None
    }

    fn open(&mut self, params: &RotatorParams) -> Result<(), PipeError> {
        self.params = Some(*params);
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.params = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.params.is_some()
    }

    fn params(&self) -> Option<RotatorParams> {
        self.params
    }
}

/// Hardware rotator session.
pub struct HwRotator {
    id: ResourceId,
    device: Arc<dyn OverlayDevice>,
    params: Option<RotatorParams>,
}

impl HwRotator {
    pub fn new(device: Arc<dyn OverlayDevice>) -> Self {
        Self {
            id: ResourceId::new_unique(),
            device,
            params: None,
        }
    }
}

impl fmt::Debug for HwRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HwRotator")
            .field("id", &self.id)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Rotator for HwRotator {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn role(&self) -> RotatorRole {
        RotatorRole::Active
    }

    fn open(&mut self, params: &RotatorParams) -> Result<(), PipeError> {
        if self.params.as_ref() == Some(params) {
            return Ok(());
        }
        if self.params.is_some() {
            // The session has to be torn down before new parameters apply.
            self.params = None;
            self.device.close_rotator(self.id)?;
        }
        self.device.open_rotator(self.id, params)?;
        trace!("rotator {} opened with {} {}x{}", self.id, params.transform, params.width, params.height);
        self.params = Some(*params);
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipeError> {
        if self.params.take().is_none() {
            return Ok(());
        }
        trace!("rotator {} closing", self.id);
        self.device.close_rotator(self.id)
    }

    fn is_open(&self) -> bool {
        self.params.is_some()
    }

    fn params(&self) -> Option<RotatorParams> {
        self.params
    }
}

/// Builds the rotator variant for `role`.
pub fn create_rotator(role: RotatorRole, device: &Arc<dyn OverlayDevice>) -> Box<dyn Rotator> {
    match role {
        RotatorRole::None => Box::new(NullRotator::new()),
        RotatorRole::Active => Box::new(HwRotator::new(Arc::clone(device))),
    }
}
