// novade-overlay-state/tests/transitions.rs

use std::collections::HashSet;
use std::sync::Arc;

use novade_overlay_core::{init_minimal_logging, CompositionState, PipeRole, RotatorRole, SlotIndex, SlotRole};
use novade_overlay_pipes::{OverlayDevice, RecordingDevice, ResourceId};
use novade_overlay_state::{OverlayState, ResourceHolder, SlotPolicy, SlotSnapshot, TransitionPlan};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn setup() -> (Arc<RecordingDevice>, OverlayState) {
    init_minimal_logging();
    let recording = Arc::new(RecordingDevice::new());
    let device: Arc<dyn OverlayDevice> = recording.clone();
    (recording, OverlayState::new(device))
}

fn open_states() -> impl Iterator<Item = CompositionState> {
    CompositionState::ALL.into_iter().filter(|s| !s.is_closed())
}

fn snapshots(holder: &ResourceHolder) -> Vec<SlotSnapshot> {
    SlotIndex::ALL
        .into_iter()
        .map(|slot| holder.slot(slot).expect("slot should be occupied"))
        .collect()
}

fn ids(snapshot: &SlotSnapshot) -> [ResourceId; 2] {
    [snapshot.pipe_id, snapshot.rotator_id]
}

#[test]
fn same_state_returns_identical_holder() {
    for state in CompositionState::ALL {
        let (recording, mut engine) = setup();
        let holder = engine.handle_event(state, None);
        let before = holder.as_ref().map(ResourceHolder::id);
        let events = recording.events().len();

        let holder = engine.handle_event(state, holder);

        assert_eq!(holder.as_ref().map(ResourceHolder::id), before, "{}", state);
        assert_eq!(engine.state(), state);
        assert_eq!(recording.events().len(), events, "{} touched the device", state);
    }
}

#[test]
fn round_trip_through_closed_releases_and_reallocates_everything() {
    for state in open_states() {
        let (recording, mut engine) = setup();
        let first = engine.handle_event(state, None).expect("allocation succeeds");
        let first_ids: HashSet<ResourceId> = snapshots(&first).iter().flat_map(ids).collect();

        assert!(engine.handle_event(CompositionState::Closed, Some(first)).is_none());
        assert!(recording.open_resources().is_empty(), "{} leaked", state);

        let second = engine.handle_event(state, None).expect("allocation succeeds");
        for id in snapshots(&second).iter().flat_map(ids) {
            assert!(!first_ids.contains(&id), "{} survived the round trip in {}", id, state);
        }
        for id in &first_ids {
            assert!(recording.open_count(*id) <= 1);
            assert_eq!(recording.open_count(*id), recording.close_count(*id), "{} in {}", id, state);
        }
        engine.handle_event(CompositionState::Closed, Some(second));
    }
}

#[rstest]
#[case(CompositionState::VideoOnPanel, CompositionState::VideoOnPanelTv)]
#[case(CompositionState::VideoOnPanelTv, CompositionState::VideoOnPanel)]
#[case(CompositionState::VideoOnPanelTv, CompositionState::VideoOnTv)]
#[case(CompositionState::VideoOnTv, CompositionState::VideoOnPanelTv)]
#[case(CompositionState::UiMirror, CompositionState::TrueUiMirror)]
#[case(CompositionState::TrueUiMirror, CompositionState::UiMirror)]
#[case(CompositionState::VideoOnPanel, CompositionState::TrueUiMirror)]
#[case(CompositionState::TrueUiMirror, CompositionState::VideoOnPanel)]
fn fast_paths_keep_resource_identity(#[case] from: CompositionState, #[case] to: CompositionState) {
    let (recording, mut engine) = setup();
    let holder = engine.handle_event(from, None).expect("allocation succeeds");
    let before = snapshots(&holder);
    let plan = TransitionPlan::for_pair(from, to);
    assert!(plan.is_fast_path());

    let holder = engine.handle_event(to, Some(holder)).expect("migration keeps a holder");
    let after = snapshots(&holder);

    for slot in SlotIndex::ALL {
        let (old, new) = (&before[slot.index()], &after[slot.index()]);
        match plan.policy(slot) {
            SlotPolicy::Preserve => {
                assert_eq!(ids(old), ids(new), "{} of {} -> {}", slot, from, to);
                assert_eq!(recording.close_count(old.pipe_id), 0);
            }
            SlotPolicy::Recreate => {
                assert_ne!(old.pipe_id, new.pipe_id);
                assert_ne!(old.rotator_id, new.rotator_id);
                assert!(!recording.is_open(old.pipe_id));
                assert!(!recording.is_open(old.rotator_id));
            }
        }
    }
    assert_eq!(engine.state(), to);
}

#[test]
fn general_rule_moves_floating_slot_and_recreates_content() {
    for from in open_states() {
        for to in open_states().filter(|to| *to != from) {
            let plan = TransitionPlan::for_pair(from, to);
            let (recording, mut engine) = setup();
            let holder = engine.handle_event(from, None).expect("allocation succeeds");
            let before = snapshots(&holder);

            let holder = engine.handle_event(to, Some(holder)).expect("migration keeps a holder");
            let after = snapshots(&holder);

            let floating = SlotIndex::FLOATING.index();
            assert_eq!(ids(&before[floating]), ids(&after[floating]), "{} -> {}", from, to);
            assert!(recording.is_open(after[floating].pipe_id));

            for slot in SlotIndex::CONTENT {
                if plan.policy(slot) == SlotPolicy::Recreate {
                    let (old, new) = (&before[slot.index()], &after[slot.index()]);
                    assert_ne!(old.pipe_id, new.pipe_id, "{} of {} -> {}", slot, from, to);
                    assert_eq!(recording.open_count(old.pipe_id), recording.close_count(old.pipe_id));
                }
                assert_eq!(after[slot.index()].role, holder.roles()[slot.index()]);
            }
            assert_eq!(holder.state(), to);
            assert_eq!(engine.state(), to);
        }
    }
}

#[test]
fn closed_to_bypass_one_layer() {
    let (recording, mut engine) = setup();
    let holder = engine
        .handle_event(CompositionState::Bypass1Layer, None)
        .expect("allocation succeeds");

    let roles: Vec<SlotRole> = snapshots(&holder).iter().map(|s| s.role).collect();
    assert_eq!(
        roles,
        vec![
            SlotRole::new(PipeRole::Primary, RotatorRole::None),
            SlotRole::NONE,
            SlotRole::NONE,
            SlotRole::FLOATING,
        ]
    );
    let slot0 = holder.slot(SlotIndex::Pipe0).unwrap();
    assert!(slot0.pipe_open);
    assert!(recording.is_open(slot0.pipe_id));
    assert_eq!(engine.state(), CompositionState::Bypass1Layer);
}

#[test]
fn video_on_panel_to_panel_and_tv() {
    let (recording, mut engine) = setup();
    let holder = engine.handle_event(CompositionState::VideoOnPanel, None).unwrap();
    let before = snapshots(&holder);

    let holder = engine
        .handle_event(CompositionState::VideoOnPanelTv, Some(holder))
        .unwrap();
    let after = snapshots(&holder);

    assert_eq!(ids(&after[0]), ids(&before[0]));
    assert_eq!(after[1].role, SlotRole::new(PipeRole::VideoExt, RotatorRole::Active));
    assert!(recording.is_open(after[1].pipe_id));
    assert!(recording.is_open(after[1].rotator_id));
    assert_eq!(recording.open_count(after[1].pipe_id), 1);
    assert_eq!(after[2].role, SlotRole::new(PipeRole::External, RotatorRole::None));
    assert!(recording.is_open(after[2].pipe_id));
    assert_eq!(ids(&after[3]), ids(&before[3]));
}

#[test]
fn any_state_to_closed_closes_once() {
    for state in open_states() {
        let (recording, mut engine) = setup();
        let holder = engine.handle_event(state, None).unwrap();
        let all: Vec<ResourceId> = recording.open_resources();

        assert!(engine.handle_event(CompositionState::Closed, Some(holder)).is_none());
        assert_eq!(engine.state(), CompositionState::Closed);
        for id in all {
            assert_eq!(recording.close_count(id), 1, "{} in {}", id, state);
        }
    }
}

#[test]
fn teardown_failure_still_completes() {
    let (recording, mut engine) = setup();
    let holder = engine.handle_event(CompositionState::TrueUiMirror, None).unwrap();
    recording.fail_next_closes(3);

    assert!(engine.handle_event(CompositionState::Closed, Some(holder)).is_none());
    assert_eq!(engine.state(), CompositionState::Closed);
    assert!(recording.open_resources().is_empty());
}

#[test]
fn init_failure_returns_none_but_advances_state() {
    let (recording, mut engine) = setup();
    recording.fail_next_opens(1);

    let holder = engine.handle_event(CompositionState::VideoOnPanelTv, None);

    assert!(holder.is_none());
    assert_eq!(engine.state(), CompositionState::VideoOnPanelTv);
    assert!(recording.open_resources().is_empty());

    // Recovery goes through a hard reset.
    let holder = engine.reset(CompositionState::VideoOnPanelTv);
    assert!(holder.is_some());
}

#[test]
fn reinit_failure_during_migration_leaves_slot_empty() {
    let (recording, mut engine) = setup();
    let holder = engine.handle_event(CompositionState::FramebufferOnly, None).unwrap();
    recording.fail_next_opens(1);

    let holder = engine
        .handle_event(CompositionState::DualDisplay, Some(holder))
        .expect("migration keeps a holder");

    assert_eq!(holder.slot(SlotIndex::Pipe0), None);
    assert!(holder.slot(SlotIndex::FLOATING).is_some());
    assert_eq!(engine.state(), CompositionState::DualDisplay);
}
