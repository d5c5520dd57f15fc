use thiserror::Error;

use crate::id::ResourceId;

/// Failures reported by pipes, rotators and the underlying device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipeError {
    /// Opening a pipe failed.
    #[error("failed to open pipe {id}: {reason}")]
    OpenFailed { id: ResourceId, reason: String },

    /// Closing a pipe or rotator failed. The resource is considered released.
    #[error("failed to close {id}: {reason}")]
    CloseFailed { id: ResourceId, reason: String },

    /// The operation needs an open resource.
    #[error("resource {0} is not open")]
    NotOpen(ResourceId),

    /// Opening or reconfiguring a rotator failed.
    #[error("rotator {id} failed: {reason}")]
    RotatorFailed { id: ResourceId, reason: String },
}
