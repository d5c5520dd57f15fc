//! Interface to the display driver's overlay hardware.
//!
//! The driver is an external collaborator; this crate only needs the minimal
//! lifecycle exposed by [`OverlayDevice`]. [`RecordingDevice`] implements it in
//! memory and keeps enough bookkeeping to verify how resources were used.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use bitflags::bitflags;
use novade_overlay_core::{DisplayTarget, PipeRole, RotatorParams, StereoChannel};

use crate::error::PipeError;
use crate::id::ResourceId;
use crate::pipe::BufferHandle;

bitflags! {
    /// Hardware features a pipe is opened with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipeFlags: u32 {
        /// Scans out video content.
        const VIDEO = 1 << 0;
        /// Composes the framebuffer.
        const FRAMEBUFFER = 1 << 1;
        /// Mirrors the primary UI onto another output.
        const MIRROR = 1 << 2;
        /// Carries one half of a stereo pair.
        const STEREO = 1 << 3;
        /// Fed by a hardware rotator.
        const ROTATED = 1 << 4;
    }
}

/// What the driver needs to know to open a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeSpec {
    pub role: PipeRole,
    pub target: DisplayTarget,
    pub channel: Option<StereoChannel>,
    pub flags: PipeFlags,
}

impl PipeSpec {
    /// Hardware description of `role`; `None` for the placeholder role.
    pub fn for_role(role: PipeRole) -> Option<PipeSpec> {
        let target = role.target()?;
        let flags = match role {
            PipeRole::None => return None,
            PipeRole::Primary | PipeRole::External => PipeFlags::empty(),
            PipeRole::VideoExt => PipeFlags::VIDEO,
            PipeRole::UiMirror => PipeFlags::MIRROR,
            PipeRole::Floating => PipeFlags::FRAMEBUFFER,
            PipeRole::M3dPrimary(_) | PipeRole::M3dExt(_) => PipeFlags::VIDEO,
            PipeRole::S3dPrimary(_) | PipeRole::S3dExt(_) => PipeFlags::VIDEO | PipeFlags::STEREO,
        };
        Some(PipeSpec {
            role,
            target,
            channel: role.stereo_channel(),
            flags,
        })
    }

    /// The same spec, marked as fed by a rotator.
    pub fn rotated(mut self) -> PipeSpec {
        self.flags |= PipeFlags::ROTATED;
        self
    }
}

/// Minimal lifecycle interface of the overlay driver.
///
/// Calls are synchronous and either succeed or fail immediately.
pub trait OverlayDevice: Send + Sync + fmt::Debug {
    fn open_pipe(&self, id: ResourceId, spec: &PipeSpec) -> Result<(), PipeError>;
    fn close_pipe(&self, id: ResourceId) -> Result<(), PipeError>;
    fn queue_buffer(&self, id: ResourceId, buffer: &BufferHandle) -> Result<(), PipeError>;
    fn open_rotator(&self, id: ResourceId, params: &RotatorParams) -> Result<(), PipeError>;
    fn close_rotator(&self, id: ResourceId) -> Result<(), PipeError>;
}

/// Something that happened on a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    PipeOpened(ResourceId, PipeSpec),
    PipeClosed(ResourceId),
    RotatorOpened(ResourceId, RotatorParams),
    RotatorClosed(ResourceId),
    BufferQueued(ResourceId, BufferHandle),
}

#[derive(Debug, Default)]
struct RecordingState {
    open_pipes: HashMap<ResourceId, PipeSpec>,
    open_rotators: HashMap<ResourceId, RotatorParams>,
    opens: HashMap<ResourceId, u32>,
    closes: HashMap<ResourceId, u32>,
    events: Vec<DeviceEvent>,
    pass_opens: u32,
    fail_opens: u32,
    fail_closes: u32,
}

impl RecordingState {
    fn take_open_failure(&mut self) -> bool {
        if self.fail_opens == 0 {
            false
        } else if self.pass_opens > 0 {
            self.pass_opens -= 1;
            false
        } else {
            self.fail_opens -= 1;
            true
        }
    }

    fn take_close_failure(&mut self) -> bool {
        if self.fail_closes > 0 {
            self.fail_closes -= 1;
            true
        } else {
            false
        }
    }
}

/// In-memory overlay device.
///
/// Tracks which resources are open, how often each id was opened and closed
/// and the order of all operations. Failures can be injected for the next
/// open or close calls. A failed close still releases the resource, matching
/// how the hardware treats a close that reports an error.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: Mutex<RecordingState>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next `count` open calls (pipes or rotators) fail.
    pub fn fail_next_opens(&self, count: u32) {
        self.fail_opens_after(0, count);
    }

    /// Lets `successes` open calls through, then fails the following `count`.
    pub fn fail_opens_after(&self, successes: u32, count: u32) {
        let mut state = self.lock();
        state.pass_opens = successes;
        state.fail_opens = count;
    }

    /// Makes the next `count` close calls (pipes or rotators) report failure.
    pub fn fail_next_closes(&self, count: u32) {
        self.lock().fail_closes = count;
    }

    pub fn open_count(&self, id: ResourceId) -> u32 {
        self.lock().opens.get(&id).copied().unwrap_or(0)
    }

    pub fn close_count(&self, id: ResourceId) -> u32 {
        self.lock().closes.get(&id).copied().unwrap_or(0)
    }

    pub fn is_open(&self, id: ResourceId) -> bool {
        let state = self.lock();
        state.open_pipes.contains_key(&id) || state.open_rotators.contains_key(&id)
    }

    /// Ids of every pipe and rotator currently open, sorted.
    pub fn open_resources(&self) -> Vec<ResourceId> {
        let state = self.lock();
        let mut ids: Vec<ResourceId> = state.open_pipes.keys().chain(state.open_rotators.keys()).copied().collect();
        ids.sort();
        ids
    }

    pub fn pipe_spec(&self, id: ResourceId) -> Option<PipeSpec> {
        self.lock().open_pipes.get(&id).copied()
    }

    pub fn rotator_params(&self, id: ResourceId) -> Option<RotatorParams> {
        self.lock().open_rotators.get(&id).copied()
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.lock().events.clone()
    }

    /// Total number of open calls that succeeded.
    pub fn total_opens(&self) -> u32 {
        self.lock().opens.values().sum()
    }

    /// Total number of close calls, failed ones included.
    pub fn total_closes(&self) -> u32 {
        self.lock().closes.values().sum()
    }
}

impl OverlayDevice for RecordingDevice {
    fn open_pipe(&self, id: ResourceId, spec: &PipeSpec) -> Result<(), PipeError> {
        let mut state = self.lock();
        if state.take_open_failure() {
            return Err(PipeError::OpenFailed {
                id,
                reason: format!("no free {} pipe", spec.role),
            });
        }
        state.open_pipes.insert(id, *spec);
        *state.opens.entry(id).or_insert(0) += 1;
        state.events.push(DeviceEvent::PipeOpened(id, *spec));
        Ok(())
    }

    fn close_pipe(&self, id: ResourceId) -> Result<(), PipeError> {
        let mut state = self.lock();
        if state.open_pipes.remove(&id).is_none() {
            return Err(PipeError::NotOpen(id));
        }
        *state.closes.entry(id).or_insert(0) += 1;
        state.events.push(DeviceEvent::PipeClosed(id));
        if state.take_close_failure() {
            return Err(PipeError::CloseFailed {
                id,
                reason: "driver rejected unset".to_string(),
            });
        }
        Ok(())
    }

    fn queue_buffer(&self, id: ResourceId, buffer: &BufferHandle) -> Result<(), PipeError> {
        let mut state = self.lock();
        if !state.open_pipes.contains_key(&id) {
            return Err(PipeError::NotOpen(id));
        }
        state.events.push(DeviceEvent::BufferQueued(id, *buffer));
        Ok(())
    }

    fn open_rotator(&self, id: ResourceId, params: &RotatorParams) -> Result<(), PipeError> {
        let mut state = self.lock();
        if state.take_open_failure() {
            return Err(PipeError::RotatorFailed {
                id,
                reason: "no rotator session available".to_string(),
            });
        }
        state.open_rotators.insert(id, *params);
        *state.opens.entry(id).or_insert(0) += 1;
        state.events.push(DeviceEvent::RotatorOpened(id, *params));
        Ok(())
    }

    fn close_rotator(&self, id: ResourceId) -> Result<(), PipeError> {
        let mut state = self.lock();
        if state.open_rotators.remove(&id).is_none() {
            return Err(PipeError::NotOpen(id));
        }
        *state.closes.entry(id).or_insert(0) += 1;
        state.events.push(DeviceEvent::RotatorClosed(id));
        if state.take_close_failure() {
            return Err(PipeError::CloseFailed {
                id,
                reason: "rotator session stuck".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    assert_impl_all!(RecordingDevice: OverlayDevice, Send, Sync);

    #[test]
    fn placeholder_role_has_no_spec() {
        assert_eq!(PipeSpec::for_role(PipeRole::None), None);
    }

    #[test]
    fn specs_follow_roles() {
        let floating = PipeSpec::for_role(PipeRole::Floating).unwrap();
        assert_eq!(floating.target, DisplayTarget::Primary);
        assert_eq!(floating.flags, PipeFlags::FRAMEBUFFER);

        let s3d = PipeSpec::for_role(PipeRole::S3dExt(StereoChannel::Right)).unwrap();
        assert_eq!(s3d.target, DisplayTarget::External);
        assert_eq!(s3d.channel, Some(StereoChannel::Right));
        assert!(s3d.flags.contains(PipeFlags::STEREO | PipeFlags::VIDEO));

        let mirror = PipeSpec::for_role(PipeRole::UiMirror).unwrap().rotated();
        assert_eq!(mirror.flags, PipeFlags::MIRROR | PipeFlags::ROTATED);
    }

    #[test]
    fn records_open_and_close() {
        let device = RecordingDevice::new();
        let id = ResourceId::new_unique();
        let spec = PipeSpec::for_role(PipeRole::Primary).unwrap();

        device.open_pipe(id, &spec).unwrap();
        assert!(device.is_open(id));
        assert_eq!(device.pipe_spec(id), Some(spec));

        device.close_pipe(id).unwrap();
        assert!(!device.is_open(id));
        assert_eq!(device.open_count(id), 1);
        assert_eq!(device.close_count(id), 1);
        assert_eq!(device.events(), vec![DeviceEvent::PipeOpened(id, spec), DeviceEvent::PipeClosed(id)]);
    }

    #[test]
    fn closing_unknown_resource_is_not_open() {
        let device = RecordingDevice::new();
        let id = ResourceId::new_unique();
        assert_eq!(device.close_pipe(id), Err(PipeError::NotOpen(id)));
        assert_eq!(device.close_rotator(id), Err(PipeError::NotOpen(id)));
        assert_eq!(device.total_closes(), 0);
    }

    #[test]
    fn injected_open_failures_are_consumed() {
        let device = RecordingDevice::new();
        device.fail_next_opens(1);
        let first = ResourceId::new_unique();
        let second = ResourceId::new_unique();

        assert!(device.open_rotator(first, &RotatorParams::default()).is_err());
        assert!(device.open_rotator(second, &RotatorParams::default()).is_ok());
        assert_eq!(device.open_resources(), vec![second]);
    }

    #[test]
    fn delayed_open_failures() {
        let device = RecordingDevice::new();
        device.fail_opens_after(1, 1);
        let spec = PipeSpec::for_role(PipeRole::Primary).unwrap();

        assert!(device.open_pipe(ResourceId::new_unique(), &spec).is_ok());
        assert!(device.open_pipe(ResourceId::new_unique(), &spec).is_err());
        assert!(device.open_pipe(ResourceId::new_unique(), &spec).is_ok());
        assert_eq!(device.total_opens(), 2);
    }

    #[test]
    fn failed_close_still_releases() {
        let device = RecordingDevice::new();
        let id = ResourceId::new_unique();
        device.open_pipe(id, &PipeSpec::for_role(PipeRole::External).unwrap()).unwrap();
        device.fail_next_closes(1);

        assert!(matches!(device.close_pipe(id), Err(PipeError::CloseFailed { .. })));
        assert!(!device.is_open(id));
        assert_eq!(device.close_count(id), 1);
    }

    #[test]
    fn queue_requires_open_pipe() {
        let device = RecordingDevice::new();
        let id = ResourceId::new_unique();
        let buffer = BufferHandle::new(7, 64, 64);
        assert_eq!(device.queue_buffer(id, &buffer), Err(PipeError::NotOpen(id)));

        device.open_pipe(id, &PipeSpec::for_role(PipeRole::Primary).unwrap()).unwrap();
        device.queue_buffer(id, &buffer).unwrap();
        assert!(device.events().contains(&DeviceEvent::BufferQueued(id, buffer)));
    }
}
