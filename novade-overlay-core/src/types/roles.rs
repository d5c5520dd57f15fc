//! Slot addressing and per-slot roles.
//!
//! Every non-closed composition state owns exactly four resource slots. Slots
//! 0 to 2 carry content pipes; slot 3 always carries the floating
//! (framebuffer compositing) pipe.

use std::fmt;

use crate::error::CoreError;

/// Number of resource slots tracked per composition state.
pub const SLOT_COUNT: usize = 4;

/// One of the four fixed resource slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotIndex {
    Pipe0,
    Pipe1,
    Pipe2,
    Pipe3,
}

impl SlotIndex {
    /// All slots in ascending order.
    pub const ALL: [SlotIndex; SLOT_COUNT] =
        [SlotIndex::Pipe0, SlotIndex::Pipe1, SlotIndex::Pipe2, SlotIndex::Pipe3];

    /// The content slots, which may be recreated on a state change.
    pub const CONTENT: [SlotIndex; 3] = [SlotIndex::Pipe0, SlotIndex::Pipe1, SlotIndex::Pipe2];

    /// The slot reserved for the floating framebuffer pipe.
    pub const FLOATING: SlotIndex = SlotIndex::Pipe3;

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for SlotIndex {
    type Error = CoreError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        SlotIndex::ALL
            .get(value)
            .copied()
            .ok_or_else(|| CoreError::InvalidInput(format!("slot index {} out of range", value)))
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipe{}", self.index())
    }
}

/// Physical output a pipe feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayTarget {
    /// The built-in panel.
    Primary,
    /// The external display (HDMI/TV).
    External,
}

/// Which half of a stereo pair a 3D pipe carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoChannel {
    Left,
    Right,
}

/// Role a pipe plays inside a composition state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipeRole {
    /// Placeholder; never allocates a hardware pipe.
    None,
    /// Generic pipe on the primary panel.
    Primary,
    /// Generic pipe on the external display.
    External,
    /// Video pipe on the external display.
    VideoExt,
    /// Pipe mirroring the UI onto the external display.
    UiMirror,
    /// Framebuffer compositing pipe, present in every non-closed state.
    Floating,
    /// 3D content rendered as 2D on the primary panel.
    M3dPrimary(StereoChannel),
    /// 3D content rendered as 2D on the external display.
    M3dExt(StereoChannel),
    /// Stereo 3D on the primary panel.
    S3dPrimary(StereoChannel),
    /// Stereo 3D on the external display.
    S3dExt(StereoChannel),
}

impl PipeRole {
    pub const fn is_none(self) -> bool {
        matches!(self, PipeRole::None)
    }

    /// The output this role drives, `None` for the placeholder role.
    pub const fn target(self) -> Option<DisplayTarget> {
        match self {
            PipeRole::None => None,
            PipeRole::Primary
            | PipeRole::Floating
            | PipeRole::M3dPrimary(_)
            | PipeRole::S3dPrimary(_) => Some(DisplayTarget::Primary),
            PipeRole::External
            | PipeRole::VideoExt
            | PipeRole::UiMirror
            | PipeRole::M3dExt(_)
            | PipeRole::S3dExt(_) => Some(DisplayTarget::External),
        }
    }

    pub const fn stereo_channel(self) -> Option<StereoChannel> {
        match self {
            PipeRole::M3dPrimary(ch) | PipeRole::M3dExt(ch) | PipeRole::S3dPrimary(ch) | PipeRole::S3dExt(ch) => {
                Some(ch)
            }
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PipeRole::None => "null",
            PipeRole::Primary => "primary",
            PipeRole::External => "external",
            PipeRole::VideoExt => "video-ext",
            PipeRole::UiMirror => "ui-mirror",
            PipeRole::Floating => "floating",
            PipeRole::M3dPrimary(_) => "m3d-primary",
            PipeRole::M3dExt(_) => "m3d-ext",
            PipeRole::S3dPrimary(_) => "s3d-primary",
            PipeRole::S3dExt(_) => "s3d-ext",
        }
    }
}

impl fmt::Display for PipeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stereo_channel() {
            Some(StereoChannel::Left) => write!(f, "{}(left)", self.name()),
            Some(StereoChannel::Right) => write!(f, "{}(right)", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Whether a slot is preceded by a hardware rotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotatorRole {
    /// Placeholder rotator; pass-through.
    None,
    /// A hardware pre-rotation stage.
    Active,
}

impl fmt::Display for RotatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotatorRole::None => f.write_str("null"),
            RotatorRole::Active => f.write_str("rotator"),
        }
    }
}

/// Pipe and rotator role of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRole {
    pub pipe: PipeRole,
    pub rotator: RotatorRole,
}

impl SlotRole {
    /// An unused slot.
    pub const NONE: SlotRole = SlotRole::new(PipeRole::None, RotatorRole::None);

    /// The framebuffer slot shared by every non-closed state.
    pub const FLOATING: SlotRole = SlotRole::new(PipeRole::Floating, RotatorRole::None);

    pub const fn new(pipe: PipeRole, rotator: RotatorRole) -> Self {
        Self { pipe, rotator }
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.pipe, self.rotator)
    }
}
