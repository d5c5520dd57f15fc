//! Display composition states.
//!
//! A [`CompositionState`] names one display configuration: how many overlay
//! pipes are in use, which output each of them drives and whether a rotator
//! precedes it. The set is closed and known at build time; the slot layout of
//! every state is described by the state registry of `novade-overlay-state`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// One of the enumerated display configuration modes.
///
/// `Closed` is the only state without any hardware resources. It is the
/// initial state of every engine.
///
/// In configuration files states are written with their lower-case canonical
/// name, e.g. `"2d_video_on_panel_tv"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompositionState {
    /// No overlay resources allocated.
    #[default]
    Closed,
    /// 2D video on the built-in panel.
    VideoOnPanel,
    /// 2D video on the panel and on the TV, with subtitles on the TV.
    VideoOnPanelTv,
    /// 2D video on the TV only.
    VideoOnTv,
    /// 3D content shown as 2D (one eye) on a 2D panel.
    Video3dOn2dPanel,
    /// Stereo 3D content on a 3D capable panel.
    Video3dOn3dPanel,
    /// Stereo 3D content on a 3D capable TV.
    Video3dOn3dTv,
    /// 3D content shown as 2D on both the panel and the TV.
    Video3dOn2dPanel2dTv,
    /// UI mirrored to the external display.
    UiMirror,
    /// UI mirrored to the external display while video plays on both outputs.
    TrueUiMirror,
    /// Composition bypass with one layer on its own pipe.
    Bypass1Layer,
    /// Composition bypass with two layers.
    Bypass2Layer,
    /// Composition bypass with three layers.
    Bypass3Layer,
    /// Composition bypass with four layers.
    Bypass4Layer,
    /// Independent content on the external display.
    DualDisplay,
    /// Framebuffer only; the floating pipe is the sole active pipe.
    FramebufferOnly,
}

impl CompositionState {
    /// Every declared state, in declaration order.
    pub const ALL: [CompositionState; 16] = [
        CompositionState::Closed,
        CompositionState::VideoOnPanel,
        CompositionState::VideoOnPanelTv,
        CompositionState::VideoOnTv,
        CompositionState::Video3dOn2dPanel,
        CompositionState::Video3dOn3dPanel,
        CompositionState::Video3dOn3dTv,
        CompositionState::Video3dOn2dPanel2dTv,
        CompositionState::UiMirror,
        CompositionState::TrueUiMirror,
        CompositionState::Bypass1Layer,
        CompositionState::Bypass2Layer,
        CompositionState::Bypass3Layer,
        CompositionState::Bypass4Layer,
        CompositionState::DualDisplay,
        CompositionState::FramebufferOnly,
    ];

    /// Position of the state in [`CompositionState::ALL`]; used to index
    /// per-state tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `true` for the resource-free `Closed` state.
    pub const fn is_closed(self) -> bool {
        matches!(self, CompositionState::Closed)
    }

    /// Canonical upper-case name used in logs and dumps.
    pub const fn name(self) -> &'static str {
        match self {
            CompositionState::Closed => "CLOSED",
            CompositionState::VideoOnPanel => "2D_VIDEO_ON_PANEL",
            CompositionState::VideoOnPanelTv => "2D_VIDEO_ON_PANEL_TV",
            CompositionState::VideoOnTv => "2D_VIDEO_ON_TV",
            CompositionState::Video3dOn2dPanel => "3D_VIDEO_ON_2D_PANEL",
            CompositionState::Video3dOn3dPanel => "3D_VIDEO_ON_3D_PANEL",
            CompositionState::Video3dOn3dTv => "3D_VIDEO_ON_3D_TV",
            CompositionState::Video3dOn2dPanel2dTv => "3D_VIDEO_ON_2D_PANEL_2D_TV",
            CompositionState::UiMirror => "UI_MIRROR",
            CompositionState::TrueUiMirror => "2D_TRUE_UI_MIRROR",
            CompositionState::Bypass1Layer => "BYPASS_1_LAYER",
            CompositionState::Bypass2Layer => "BYPASS_2_LAYER",
            CompositionState::Bypass3Layer => "BYPASS_3_LAYER",
            CompositionState::Bypass4Layer => "BYPASS_4_LAYER",
            CompositionState::DualDisplay => "DUAL_DISP",
            CompositionState::FramebufferOnly => "FB",
        }
    }
}

impl fmt::Display for CompositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompositionState {
    type Err = CoreError;

    /// Parses a canonical name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CompositionState::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown composition state '{}'", s)))
    }
}

impl TryFrom<String> for CompositionState {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompositionState> for String {
    fn from(state: CompositionState) -> Self {
        state.name().to_ascii_lowercase()
    }
}
