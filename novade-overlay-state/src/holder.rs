//! Runtime owner of the pipe/rotator pairs of one composition state.
//!
//! A [`ResourceHolder`] has four slots. Each slot is either empty or owns one
//! opened pipe together with the rotator feeding it. Slots are filled by
//! [`ResourceHolder::init`] (all at once) or [`ResourceHolder::init_pipe`]
//! (one at a time), emptied by [`ResourceHolder::close`] and
//! [`ResourceHolder::close_pipe`], and moved between holders with
//! [`ResourceHolder::copy_ov_pipe`].

use std::fmt::Write as _;
use std::sync::Arc;

use novade_overlay_core::{
    CompositionState, PipeRole, RotatorParams, RotatorRole, SlotIndex, SlotRole, SLOT_COUNT,
};
use novade_overlay_pipes::{create_pipe, BufferHandle, OverlayDevice, Pipe, PipeError, ResourceId, Rotator};
use tracing::{error, trace, warn};

use crate::error::HolderError;
use crate::registry::SlotComposition;

/// Read-only view of an occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub role: SlotRole,
    pub pipe_id: ResourceId,
    pub pipe_open: bool,
    pub rotator_id: ResourceId,
    pub rotator_open: bool,
    pub rotator_params: Option<RotatorParams>,
}

#[derive(Debug)]
struct SlotResources {
    pipe: Box<dyn Pipe>,
    rotator: Box<dyn Rotator>,
}

impl SlotResources {
    fn open(role: PipeRole, mut rotator: Box<dyn Rotator>, device: &Arc<dyn OverlayDevice>) -> Result<Self, PipeError> {
        let mut pipe = create_pipe(role, device);
        if let Err(e) = pipe.open(rotator.as_mut()) {
            if let Err(close_err) = rotator.close() {
                trace!("rotator {} release after failed open: {}", rotator.id(), close_err);
            }
            return Err(e);
        }
        Ok(Self { pipe, rotator })
    }

    /// Closes pipe then rotator. Both are attempted; the first error wins.
    fn close(mut self) -> Result<(), PipeError> {
        let pipe_result = self.pipe.close();
        let rotator_result = self.rotator.close();
        pipe_result.and(rotator_result)
    }

    fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            role: SlotRole::new(self.pipe.role(), self.rotator.role()),
            pipe_id: self.pipe.id(),
            pipe_open: self.pipe.is_open(),
            rotator_id: self.rotator.id(),
            rotator_open: self.rotator.is_open(),
            rotator_params: self.rotator.params(),
        }
    }
}

/// Owns the active overlay resources of one composition state.
#[derive(Debug)]
pub struct ResourceHolder {
    id: ResourceId,
    state: CompositionState,
    roles: SlotComposition,
    device: Arc<dyn OverlayDevice>,
    slots: [Option<SlotResources>; SLOT_COUNT],
}

impl ResourceHolder {
    /// An empty holder for `state`. Use `StateRegistry::make_holder` to get
    /// the roles from the registry.
    pub fn new(state: CompositionState, roles: SlotComposition, device: Arc<dyn OverlayDevice>) -> Self {
        Self {
            id: ResourceId::new_unique(),
            state,
            roles,
            device,
            slots: [None, None, None, None],
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    pub fn roles(&self) -> &SlotComposition {
        &self.roles
    }

    pub fn slot(&self, slot: SlotIndex) -> Option<SlotSnapshot> {
        self.slots[slot.index()].as_ref().map(SlotResources::snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of slots currently owning resources.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Opens all four slots with the given rotators.
    ///
    /// When a slot fails, every slot opened before it is closed again and the
    /// holder is left empty.
    ///
    /// # Panics
    /// If the holder already owns resources.
    pub fn init(&mut self, rotators: [Box<dyn Rotator>; SLOT_COUNT]) -> Result<(), HolderError> {
        assert!(self.is_empty(), "init on holder {} which already owns resources", self.id);

        for (slot, rotator) in SlotIndex::ALL.into_iter().zip(rotators) {
            if let Err(e) = self.init_pipe(rotator, slot) {
                for opened in SlotIndex::ALL.into_iter().take_while(|s| *s != slot) {
                    if let Err(close_err) = self.close_pipe(opened) {
                        warn!("holder {}: rollback of {} failed: {}", self.id, opened, close_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Closes every slot. All slots are attempted even when some fail; the
    /// holder is empty afterwards.
    pub fn close(&mut self) -> Result<(), HolderError> {
        let failed: Vec<SlotIndex> = SlotIndex::ALL
            .into_iter()
            .filter(|slot| self.close_pipe(*slot).is_err())
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(HolderError::Teardown { slots: failed })
        }
    }

    /// Closes and drops the resources of `slot`. An empty slot is a no-op.
    pub fn close_pipe(&mut self, slot: SlotIndex) -> Result<(), HolderError> {
        let Some(resources) = self.slots[slot.index()].take() else {
            return Ok(());
        };
        trace!("holder {}: closing {} ({})", self.id, slot, self.roles[slot.index()]);
        resources.close().map_err(|e| {
            error!("holder {}: failed to close {}: {}", self.id, slot, e);
            HolderError::Teardown { slots: vec![slot] }
        })
    }

    /// Creates the pipe for `slot` and opens it behind `rotator`.
    ///
    /// # Panics
    /// If the slot is occupied.
    pub fn init_pipe(&mut self, rotator: Box<dyn Rotator>, slot: SlotIndex) -> Result<(), HolderError> {
        let index = slot.index();
        assert!(self.slots[index].is_none(), "holder {}: {} is already occupied", self.id, slot);
        debug_assert_eq!(rotator.role(), self.roles[index].rotator);

        trace!("holder {}: opening {} ({})", self.id, slot, self.roles[index]);
        let resources = SlotResources::open(self.roles[index].pipe, rotator, &self.device)
            .map_err(|source| HolderError::SlotInit { slot, source })?;
        self.slots[index] = Some(resources);
        Ok(())
    }

    /// Moves the resources of `slot` out of `other` into this holder.
    ///
    /// Nothing is closed or reopened; `other`'s slot is empty afterwards.
    ///
    /// # Panics
    /// If this holder's slot is occupied.
    pub fn copy_ov_pipe(&mut self, other: &mut ResourceHolder, slot: SlotIndex) -> Result<(), HolderError> {
        let index = slot.index();
        assert!(self.slots[index].is_none(), "holder {}: {} is already occupied", self.id, slot);
        debug_assert_eq!(self.roles[index], other.roles[index], "role mismatch moving {}", slot);

        let resources = other.slots[index].take().ok_or(HolderError::EmptySlot(slot))?;
        trace!("holder {}: {} moved from holder {}", self.id, slot, other.id);
        self.slots[index] = Some(resources);
        Ok(())
    }

    /// Queues `buffer` on the pipe of `slot`.
    pub fn queue_buffer(&mut self, slot: SlotIndex, buffer: &BufferHandle) -> Result<(), HolderError> {
        let resources = self.slots[slot.index()].as_mut().ok_or(HolderError::EmptySlot(slot))?;
        resources
            .pipe
            .queue_buffer(buffer)
            .map_err(|source| HolderError::Slot { slot, source })
    }

    /// Reopens the rotator of `slot` with new parameters.
    pub fn set_transform(&mut self, slot: SlotIndex, params: RotatorParams) -> Result<(), HolderError> {
        let resources = self.slots[slot.index()].as_mut().ok_or(HolderError::EmptySlot(slot))?;
        resources
            .rotator
            .open(&params)
            .map_err(|source| HolderError::Slot { slot, source })
    }

    /// One line per slot, prefixed by a header line.
    pub fn dump(&self) -> String {
        let mut out = format!("holder {} state={}", self.id, self.state);
        for slot in SlotIndex::ALL {
            let role = self.roles[slot.index()];
            let _ = match self.slot(slot) {
                Some(s) => write!(
                    out,
                    "\n  {}: {} pipe={}{} rotator={}{}",
                    slot,
                    role,
                    s.pipe_id,
                    if s.pipe_open { "" } else { "(closed)" },
                    s.rotator_id,
                    match s.rotator_params {
                        Some(p) if s.role.rotator == RotatorRole::Active => {
                            format!(" {} {}x{}", p.transform, p.width, p.height)
                        }
                        Some(_) => String::new(),
                        None => "(closed)".to_string(),
                    }
                ),
                None => write!(out, "\n  {}: {} <empty>", slot, role),
            };
        }
        out
    }
}

impl Drop for ResourceHolder {
    fn drop(&mut self) {
        for slot in SlotIndex::ALL {
            if let Some(resources) = self.slots[slot.index()].take() {
                warn!("holder {} dropped while owning {}; closing it", self.id, slot);
                if let Err(e) = resources.close() {
                    error!("holder {}: failed to close {} on drop: {}", self.id, slot, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StateRegistry;
    use novade_overlay_core::Transform;
    use novade_overlay_pipes::RecordingDevice;
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    assert_impl_all!(ResourceHolder: Send, std::fmt::Debug);

    fn setup() -> (Arc<RecordingDevice>, Arc<dyn OverlayDevice>) {
        let recording = Arc::new(RecordingDevice::new());
        let device: Arc<dyn OverlayDevice> = recording.clone();
        (recording, device)
    }

    fn opened(state: CompositionState, device: &Arc<dyn OverlayDevice>) -> ResourceHolder {
        let mut holder = StateRegistry::make_holder(state, device);
        holder.init(StateRegistry::make_rotators(state, device)).unwrap();
        holder
    }

    #[test]
    fn init_fills_every_slot() {
        let (recording, device) = setup();
        let holder = opened(CompositionState::VideoOnPanelTv, &device);

        assert_eq!(holder.occupied(), SLOT_COUNT);
        for slot in SlotIndex::ALL {
            let snapshot = holder.slot(slot).unwrap();
            assert_eq!(snapshot.role, holder.roles()[slot.index()]);
            assert!(snapshot.pipe_open);
            assert!(recording.is_open(snapshot.pipe_id));
        }
        // Slot 0 and 1 have rotators; both are live on the device.
        let slot0 = holder.slot(SlotIndex::Pipe0).unwrap();
        assert!(recording.is_open(slot0.rotator_id));
        assert_eq!(slot0.rotator_params, Some(RotatorParams::default()));
    }

    #[test]
    fn failing_init_rolls_back() {
        let (recording, device) = setup();
        // Slot 0 opens rotator + pipe, slot 1 fails on its rotator.
        recording.fail_opens_after(2, 1);
        let mut holder = StateRegistry::make_holder(CompositionState::VideoOnPanelTv, &device);

        let err = holder
            .init(StateRegistry::make_rotators(CompositionState::VideoOnPanelTv, &device))
            .unwrap_err();
        assert!(matches!(err, HolderError::SlotInit { slot: SlotIndex::Pipe1, .. }));
        assert!(holder.is_empty());
        assert!(recording.open_resources().is_empty());
        assert_eq!(recording.total_opens(), recording.total_closes());
    }

    #[test]
    fn close_reports_all_failing_slots() {
        let (recording, device) = setup();
        let mut holder = opened(CompositionState::Bypass3Layer, &device);
        recording.fail_next_closes(2);

        let err = holder.close().unwrap_err();
        assert_eq!(
            err,
            HolderError::Teardown {
                slots: vec![SlotIndex::Pipe0, SlotIndex::Pipe1]
            }
        );
        assert!(holder.is_empty());
        assert!(recording.open_resources().is_empty());
    }

    #[test]
    fn close_pipe_on_empty_slot_is_noop() {
        let (_recording, device) = setup();
        let mut holder = StateRegistry::make_holder(CompositionState::UiMirror, &device);
        assert_eq!(holder.close_pipe(SlotIndex::Pipe2), Ok(()));
    }

    #[test]
    fn copy_moves_without_reopening() {
        let (recording, device) = setup();
        let mut from = opened(CompositionState::VideoOnPanel, &device);
        let mut to = StateRegistry::make_holder(CompositionState::FramebufferOnly, &device);
        let floating = from.slot(SlotIndex::FLOATING).unwrap();
        let opens_before = recording.total_opens();

        to.copy_ov_pipe(&mut from, SlotIndex::FLOATING).unwrap();

        assert_eq!(to.slot(SlotIndex::FLOATING), Some(floating));
        assert_eq!(from.slot(SlotIndex::FLOATING), None);
        assert_eq!(recording.total_opens(), opens_before);
        assert_eq!(recording.close_count(floating.pipe_id), 0);
        assert_eq!(
            to.copy_ov_pipe(&mut from, SlotIndex::Pipe0),
            Err(HolderError::EmptySlot(SlotIndex::Pipe0))
        );
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn init_pipe_into_occupied_slot_panics() {
        let (_recording, device) = setup();
        let mut holder = opened(CompositionState::Bypass1Layer, &device);
        let rotator = StateRegistry::make_rotator(CompositionState::Bypass1Layer, SlotIndex::Pipe0, &device);
        let _ = holder.init_pipe(rotator, SlotIndex::Pipe0);
    }

    #[test]
    fn draw_path_operations() {
        let (recording, device) = setup();
        let mut holder = opened(CompositionState::UiMirror, &device);
        let buffer = BufferHandle::new(42, 1280, 720);

        holder.queue_buffer(SlotIndex::Pipe2, &buffer).unwrap();
        let params = RotatorParams::new(Transform::Rot90, 1280, 720);
        holder.set_transform(SlotIndex::Pipe2, params).unwrap();

        let slot2 = holder.slot(SlotIndex::Pipe2).unwrap();
        assert_eq!(slot2.role.rotator, RotatorRole::Active);
        assert_eq!(recording.rotator_params(slot2.rotator_id), Some(params));

        holder.close_pipe(SlotIndex::Pipe2).unwrap();
        assert_eq!(holder.queue_buffer(SlotIndex::Pipe2, &buffer), Err(HolderError::EmptySlot(SlotIndex::Pipe2)));
    }

    #[test]
    fn drop_closes_remaining_resources() {
        let (recording, device) = setup();
        let holder = opened(CompositionState::TrueUiMirror, &device);
        assert!(!recording.open_resources().is_empty());
        drop(holder);
        assert!(recording.open_resources().is_empty());
    }

    #[test]
    fn dump_has_a_line_per_slot() {
        let (_recording, device) = setup();
        let mut holder = opened(CompositionState::VideoOnTv, &device);
        holder.close_pipe(SlotIndex::Pipe0).unwrap();

        let dump = holder.dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 1 + SLOT_COUNT);
        assert!(lines[0].contains("2D_VIDEO_ON_TV"));
        assert!(lines[1].contains("<empty>"));
        assert!(lines[2].contains("video-ext+rotator"));
        assert!(lines[4].starts_with("  pipe3: floating+null"));
    }
}
