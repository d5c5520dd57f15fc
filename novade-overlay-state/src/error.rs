use thiserror::Error;

use novade_overlay_core::{CompositionState, SlotIndex};
use novade_overlay_pipes::PipeError;

/// Failures of resource holder operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HolderError {
    /// A slot's pipe or rotator could not be brought up.
    #[error("failed to initialise {slot}: {source}")]
    SlotInit {
        slot: SlotIndex,
        #[source]
        source: PipeError,
    },

    /// One or more slots reported a failure while closing. Their resources
    /// are released regardless.
    #[error("failed to close {}", format_slots(.slots))]
    Teardown { slots: Vec<SlotIndex> },

    /// The slot owns no resources.
    #[error("{0} is empty")]
    EmptySlot(SlotIndex),

    /// A draw-path operation on an open slot failed.
    #[error("{slot}: {source}")]
    Slot {
        slot: SlotIndex,
        #[source]
        source: PipeError,
    },

    /// No resources are allocated for the recorded state.
    #[error("no overlay resources allocated in state {0}")]
    NotAllocated(CompositionState),
}

fn format_slots(slots: &[SlotIndex]) -> String {
    slots.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use novade_overlay_pipes::ResourceId;
    use std::error::Error as _;

    #[test]
    fn teardown_lists_every_slot() {
        let err = HolderError::Teardown {
            slots: vec![SlotIndex::Pipe0, SlotIndex::Pipe2],
        };
        assert_eq!(err.to_string(), "failed to close pipe0, pipe2");
    }

    #[test]
    fn slot_init_keeps_pipe_error_as_source() {
        let id = ResourceId::new_unique();
        let err = HolderError::SlotInit {
            slot: SlotIndex::Pipe1,
            source: PipeError::NotOpen(id),
        };
        assert!(err.to_string().starts_with("failed to initialise pipe1"));
        assert!(err.source().is_some());
    }
}
