//! Owner of the engine and its current holder.

use std::sync::{Arc, Mutex};

use novade_overlay_core::{CompositionState, EngineConfig, RotatorParams, SlotIndex};
use novade_overlay_pipes::{BufferHandle, OverlayDevice};
use tracing::{debug, error};

use crate::engine::OverlayState;
use crate::error::HolderError;
use crate::holder::ResourceHolder;

/// The lock callers take around every configuration change.
pub type SharedOverlay = Arc<Mutex<Overlay>>;

/// Display-configuration entry point.
///
/// Keeps the [`ResourceHolder`] of the current state between transitions
/// and forwards draw-path calls to it.
#[derive(Debug)]
pub struct Overlay {
    engine: OverlayState,
    holder: Option<ResourceHolder>,
}

impl Overlay {
    /// Creates a closed overlay, then resets into `config.initial_state` if
    /// one is set.
    pub fn new(device: Arc<dyn OverlayDevice>, config: &EngineConfig) -> Self {
        let mut overlay = Self {
            engine: OverlayState::with_config(device, config),
            holder: None,
        };
        if let Some(initial) = config.initial_state {
            if !overlay.reset(initial) {
                error!("initial state {} could not be allocated; overlay is in {}", initial, overlay.state());
            }
        }
        overlay
    }

    pub fn into_shared(self) -> SharedOverlay {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> CompositionState {
        self.engine.state()
    }

    pub fn holder(&self) -> Option<&ResourceHolder> {
        self.holder.as_ref()
    }

    /// `true` when the current state is backed by resources, or is `Closed`.
    pub fn is_ready(&self) -> bool {
        self.holder.is_some() || self.engine.state().is_closed()
    }

    /// Switches to `target`. Returns `true` only when the overlay ended up in
    /// `target` with resources allocated for it (none for `Closed`).
    ///
    /// If the previous allocation failed there is nothing to migrate and the
    /// engine is hard reset into `target` instead.
    pub fn set_state(&mut self, target: CompositionState) -> bool {
        let holder = self.holder.take();
        self.holder = if holder.is_none() && !self.engine.state().is_closed() {
            debug!("no resources for {}, retrying from scratch", self.engine.state());
            self.engine.reset(target)
        } else {
            self.engine.handle_event(target, holder)
        };
        self.reached(target)
    }

    /// Releases everything and reinitialises into `target`. Returns `true`
    /// under the same condition as [`Overlay::set_state`].
    pub fn reset(&mut self, target: CompositionState) -> bool {
        if let Some(holder) = self.holder.take() {
            self.holder = self.engine.handle_event(CompositionState::Closed, Some(holder));
        }
        self.holder = self.engine.reset(target);
        self.reached(target)
    }

    fn reached(&self, target: CompositionState) -> bool {
        self.engine.state() == target && self.holder.is_some() != target.is_closed()
    }

    pub fn queue_buffer(&mut self, slot: SlotIndex, buffer: &BufferHandle) -> Result<(), HolderError> {
        self.holder_mut()?.queue_buffer(slot, buffer)
    }

    pub fn set_transform(&mut self, slot: SlotIndex, params: RotatorParams) -> Result<(), HolderError> {
        self.holder_mut()?.set_transform(slot, params)
    }

    pub fn dump(&self) -> String {
        match &self.holder {
            Some(holder) => format!("{}\n{}", self.engine.dump(), holder.dump()),
            None => format!("{}\nno resources", self.engine.dump()),
        }
    }

    fn holder_mut(&mut self) -> Result<&mut ResourceHolder, HolderError> {
        let state = self.engine.state();
        self.holder.as_mut().ok_or(HolderError::NotAllocated(state))
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        if self.holder.is_some() {
            self.set_state(CompositionState::Closed);
        }
    }
}
