//! Static slot layout of every composition state.

use std::sync::Arc;

use novade_overlay_core::{
    CompositionState, PipeRole, RotatorRole, SlotIndex, SlotRole, StereoChannel, SLOT_COUNT,
};
use novade_overlay_pipes::{create_rotator, OverlayDevice, Rotator};

use crate::holder::ResourceHolder;

/// Pipe and rotator role of each of the four slots of one state.
pub type SlotComposition = [SlotRole; SLOT_COUNT];

const NONE: SlotRole = SlotRole::NONE;
const FLOATING: SlotRole = SlotRole::FLOATING;

const fn plain(pipe: PipeRole) -> SlotRole {
    SlotRole::new(pipe, RotatorRole::None)
}

const fn rotated(pipe: PipeRole) -> SlotRole {
    SlotRole::new(pipe, RotatorRole::Active)
}

/// Indexed by [`CompositionState::index`].
const COMPOSITIONS: [SlotComposition; CompositionState::ALL.len()] = [
    // Closed
    [NONE, NONE, NONE, NONE],
    // VideoOnPanel
    [rotated(PipeRole::Primary), NONE, NONE, FLOATING],
    // VideoOnPanelTv: video on both outputs, subtitles on the TV
    [rotated(PipeRole::Primary), rotated(PipeRole::VideoExt), plain(PipeRole::External), FLOATING],
    // VideoOnTv
    [NONE, rotated(PipeRole::VideoExt), plain(PipeRole::External), FLOATING],
    // Video3dOn2dPanel
    [rotated(PipeRole::M3dPrimary(StereoChannel::Left)), NONE, NONE, FLOATING],
    // Video3dOn3dPanel
    [
        rotated(PipeRole::S3dPrimary(StereoChannel::Left)),
        rotated(PipeRole::S3dPrimary(StereoChannel::Right)),
        NONE,
        FLOATING,
    ],
    // Video3dOn3dTv
    [
        plain(PipeRole::S3dExt(StereoChannel::Left)),
        plain(PipeRole::S3dExt(StereoChannel::Right)),
        NONE,
        FLOATING,
    ],
    // Video3dOn2dPanel2dTv
    [
        rotated(PipeRole::M3dPrimary(StereoChannel::Left)),
        plain(PipeRole::M3dExt(StereoChannel::Right)),
        NONE,
        FLOATING,
    ],
    // UiMirror
    [NONE, NONE, rotated(PipeRole::UiMirror), FLOATING],
    // TrueUiMirror
    [rotated(PipeRole::Primary), rotated(PipeRole::VideoExt), rotated(PipeRole::UiMirror), FLOATING],
    // Bypass1Layer
    [plain(PipeRole::Primary), NONE, NONE, FLOATING],
    // Bypass2Layer
    [plain(PipeRole::Primary), plain(PipeRole::Primary), NONE, FLOATING],
    // Bypass3Layer
    [plain(PipeRole::Primary), plain(PipeRole::Primary), plain(PipeRole::Primary), FLOATING],
    // Bypass4Layer: the fourth layer goes through the floating pipe
    [plain(PipeRole::Primary), plain(PipeRole::Primary), plain(PipeRole::Primary), FLOATING],
    // DualDisplay
    [plain(PipeRole::External), NONE, NONE, FLOATING],
    // FramebufferOnly
    [NONE, NONE, NONE, FLOATING],
];

/// Total lookup from a composition state to its slot layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateRegistry;

impl StateRegistry {
    pub fn composition(state: CompositionState) -> &'static SlotComposition {
        &COMPOSITIONS[state.index()]
    }

    pub fn slot_role(state: CompositionState, slot: SlotIndex) -> SlotRole {
        Self::composition(state)[slot.index()]
    }

    /// An empty holder wired to the roles of `state`.
    pub fn make_holder(state: CompositionState, device: &Arc<dyn OverlayDevice>) -> ResourceHolder {
        ResourceHolder::new(state, *Self::composition(state), Arc::clone(device))
    }

    /// A fresh rotator for `slot` of `state`.
    pub fn make_rotator(
        state: CompositionState,
        slot: SlotIndex,
        device: &Arc<dyn OverlayDevice>,
    ) -> Box<dyn Rotator> {
        create_rotator(Self::slot_role(state, slot).rotator, device)
    }

    /// Fresh rotators for all four slots of `state`.
    pub fn make_rotators(state: CompositionState, device: &Arc<dyn OverlayDevice>) -> [Box<dyn Rotator>; SLOT_COUNT] {
        SlotIndex::ALL.map(|slot| Self::make_rotator(state, slot, device))
    }
}
