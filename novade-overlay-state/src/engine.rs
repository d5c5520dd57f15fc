//! The transition engine.
//!
//! [`OverlayState`] records the current [`CompositionState`] and turns a
//! requested state change into resource work on the caller's
//! [`ResourceHolder`]. The caller keeps ownership of the holder between
//! calls; the engine consumes it and hands back its replacement.

use std::sync::Arc;

use novade_overlay_core::{CompositionState, EngineConfig, SlotIndex};
use novade_overlay_pipes::OverlayDevice;
use tracing::{debug, error, warn};

use crate::holder::ResourceHolder;
use crate::registry::StateRegistry;
use crate::transition::{SlotPolicy, Transition, TransitionPlan};

/// Current composition state plus the rules to leave it.
#[derive(Debug)]
pub struct OverlayState {
    state: CompositionState,
    device: Arc<dyn OverlayDevice>,
    rollback_on_init_failure: bool,
}

impl OverlayState {
    pub fn new(device: Arc<dyn OverlayDevice>) -> Self {
        Self {
            state: CompositionState::Closed,
            device,
            rollback_on_init_failure: false,
        }
    }

    pub fn with_config(device: Arc<dyn OverlayDevice>, config: &EngineConfig) -> Self {
        Self {
            rollback_on_init_failure: config.rollback_on_init_failure,
            ..Self::new(device)
        }
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    /// Moves to `target`, consuming the holder of the current state.
    ///
    /// Returns the holder for `target`: the same holder when nothing changes,
    /// `None` for `Closed` and `None` when allocating `target` from `Closed`
    /// failed. In the latter case the recorded state still becomes `target`
    /// unless `rollback_on_init_failure` is set.
    ///
    /// # Panics
    /// If `holder` does not match the recorded state (present iff the state
    /// is not `Closed`, and built for that state).
    pub fn handle_event(
        &mut self,
        target: CompositionState,
        holder: Option<ResourceHolder>,
    ) -> Option<ResourceHolder> {
        self.check_holder(holder.as_ref());

        match Transition::classify(self.state, target) {
            Transition::Unchanged => {
                debug!("no state change, state={}", target);
                holder
            }
            Transition::Open => {
                debug!("state changed {}-->{}", self.state, target);
                let opened = self.open(target);
                self.state = match opened {
                    None if self.rollback_on_init_failure => CompositionState::Closed,
                    _ => target,
                };
                opened
            }
            Transition::Close => {
                debug!("state changed {}-->{}", self.state, target);
                if let Some(holder) = holder {
                    self.close(holder);
                }
                self.state = target;
                None
            }
            Transition::Migrate(plan) => {
                debug!("state changed {}-->{}", self.state, target);
                let migrated = holder.map(|old| self.migrate(old, target, &plan));
                self.state = target;
                migrated
            }
        }
    }

    /// Hard reset into `target`, as if no resources were held.
    ///
    /// Whatever the caller held for the current state must already be gone.
    pub fn reset(&mut self, target: CompositionState) -> Option<ResourceHolder> {
        if !self.state.is_closed() {
            warn!("hard reset from {} to {}; treating current state as {}", self.state, target, CompositionState::Closed);
            self.state = CompositionState::Closed;
        }
        self.handle_event(target, None)
    }

    pub fn dump(&self) -> String {
        format!("== overlay state {} ==", self.state)
    }

    fn check_holder(&self, holder: Option<&ResourceHolder>) {
        match holder {
            Some(h) => {
                assert!(!self.state.is_closed(), "holder {} passed while state is {}", h.id(), self.state);
                assert_eq!(h.state(), self.state, "holder {} belongs to another state", h.id());
            }
            None => assert!(self.state.is_closed(), "no holder passed for state {}", self.state),
        }
    }

    fn open(&self, target: CompositionState) -> Option<ResourceHolder> {
        let mut holder = StateRegistry::make_holder(target, &self.device);
        match holder.init(StateRegistry::make_rotators(target, &self.device)) {
            Ok(()) => Some(holder),
            Err(e) => {
                error!("overlay failed to init in state {}: {}", target, e);
                None
            }
        }
    }

    fn close(&self, mut holder: ResourceHolder) {
        if let Err(e) = holder.close() {
            error!("failed to close overlay in state {}: {}", self.state, e);
        }
    }

    fn migrate(&self, mut old: ResourceHolder, target: CompositionState, plan: &TransitionPlan) -> ResourceHolder {
        if plan.is_fast_path() {
            debug!("fast path {}-->{} keeps {:?}", self.state, target, plan.preserved().collect::<Vec<_>>());
        }
        let mut new = StateRegistry::make_holder(target, &self.device);

        for slot in SlotIndex::ALL {
            match plan.policy(slot) {
                SlotPolicy::Preserve => {
                    if let Err(e) = new.copy_ov_pipe(&mut old, slot) {
                        error!("{}-->{}: cannot carry over {}: {}", self.state, target, slot, e);
                    }
                }
                SlotPolicy::Recreate => {
                    if let Err(e) = old.close_pipe(slot) {
                        error!("{}-->{}: {}", self.state, target, e);
                    }
                    let rotator = StateRegistry::make_rotator(target, slot, &self.device);
                    if let Err(e) = new.init_pipe(rotator, slot) {
                        error!("{}-->{}: {}; slot left empty", self.state, target, e);
                    }
                }
            }
        }

        debug_assert!(old.is_empty(), "old holder {} still owns resources", old.id());
        new
    }
}
