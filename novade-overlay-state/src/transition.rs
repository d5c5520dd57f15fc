//! Per-slot plans for moving between two composition states.
//!
//! Between two open states the content slots are recreated and the floating
//! slot is moved, unless the pair is listed in [`FAST_PATHS`]: there some
//! content slots keep an identical role in both states and are moved too, so
//! the pipe they drive is never torn down.

use novade_overlay_core::{CompositionState, SlotIndex, SLOT_COUNT};

/// What happens to one slot during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotPolicy {
    /// Move the slot's resources to the new holder untouched.
    Preserve,
    /// Close the old resources and open fresh ones for the new role.
    Recreate,
}

/// Pairs of states (usable in both directions) and the content slots they
/// carry over.
pub const FAST_PATHS: &[(CompositionState, CompositionState, &[SlotIndex])] = &[
    (
        CompositionState::VideoOnPanel,
        CompositionState::VideoOnPanelTv,
        &[SlotIndex::Pipe0],
    ),
    (
        CompositionState::VideoOnPanelTv,
        CompositionState::VideoOnTv,
        &[SlotIndex::Pipe1, SlotIndex::Pipe2],
    ),
    (
        CompositionState::UiMirror,
        CompositionState::TrueUiMirror,
        &[SlotIndex::Pipe2],
    ),
    (
        CompositionState::VideoOnPanel,
        CompositionState::TrueUiMirror,
        &[SlotIndex::Pipe0],
    ),
];

/// Slot policies for a transition between two open states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionPlan {
    slots: [SlotPolicy; SLOT_COUNT],
}

impl TransitionPlan {
    /// Recreate all content slots, move the floating one.
    pub const GENERAL: TransitionPlan = TransitionPlan {
        slots: [
            SlotPolicy::Recreate,
            SlotPolicy::Recreate,
            SlotPolicy::Recreate,
            SlotPolicy::Preserve,
        ],
    };

    /// Plan for `from` → `to`. Only meaningful when both states are open and
    /// distinct; see [`Transition::classify`].
    pub fn for_pair(from: CompositionState, to: CompositionState) -> TransitionPlan {
        let mut plan = Self::GENERAL;
        let preserved = FAST_PATHS
            .iter()
            .find(|(a, b, _)| (*a == from && *b == to) || (*a == to && *b == from))
            .map(|(_, _, slots)| *slots)
            .unwrap_or(&[]);
        for slot in preserved {
            plan.slots[slot.index()] = SlotPolicy::Preserve;
        }
        plan
    }

    pub fn policy(&self, slot: SlotIndex) -> SlotPolicy {
        self.slots[slot.index()]
    }

    /// Slots moved to the new holder, in ascending order.
    pub fn preserved(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        SlotIndex::ALL
            .into_iter()
            .filter(move |slot| self.policy(*slot) == SlotPolicy::Preserve)
    }

    /// `true` when some content slot is carried over.
    pub fn is_fast_path(&self) -> bool {
        SlotIndex::CONTENT
            .into_iter()
            .any(|slot| self.policy(slot) == SlotPolicy::Preserve)
    }
}

/// The kind of work a state change requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Target equals the current state.
    Unchanged,
    /// From `Closed` into an open state: allocate everything.
    Open,
    /// From an open state into `Closed`: release everything.
    Close,
    /// Between two open states.
    Migrate(TransitionPlan),
}

impl Transition {
    pub fn classify(from: CompositionState, to: CompositionState) -> Transition {
        if from == to {
            Transition::Unchanged
        } else if from.is_closed() {
            Transition::Open
        } else if to.is_closed() {
            Transition::Close
        } else {
            Transition::Migrate(TransitionPlan::for_pair(from, to))
        }
    }
}
