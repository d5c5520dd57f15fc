//! Rotator parameters.

use std::fmt;

/// Orientation change applied by a rotator before the pipe scans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    #[default]
    Normal,
    Rot90,
    Rot180,
    Rot270,
    FlipH,
    FlipV,
}

impl Transform {
    /// `true` when the transform swaps width and height.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Transform::Rot90 | Transform::Rot270)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transform::Normal => "normal",
            Transform::Rot90 => "rot90",
            Transform::Rot180 => "rot180",
            Transform::Rot270 => "rot270",
            Transform::FlipH => "flip-h",
            Transform::FlipV => "flip-v",
        };
        f.write_str(name)
    }
}

/// Parameters a rotator is opened with.
///
/// A zero width or height means "source size not known yet"; the rotator is
/// reopened with real dimensions once the first buffer is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RotatorParams {
    pub transform: Transform,
    pub width: u32,
    pub height: u32,
}

impl RotatorParams {
    pub fn new(transform: Transform, width: u32, height: u32) -> Self {
        Self { transform, width, height }
    }

    /// Output dimensions after the transform is applied.
    pub fn output_size(&self) -> (u32, u32) {
        if self.transform.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_identity() {
        let params = RotatorParams::default();
        assert_eq!(params.transform, Transform::Normal);
        assert_eq!(params.output_size(), (0, 0));
    }

    #[test]
    fn quarter_turns_swap_axes() {
        assert_eq!(RotatorParams::new(Transform::Rot90, 1920, 1080).output_size(), (1080, 1920));
        assert_eq!(RotatorParams::new(Transform::Rot180, 1920, 1080).output_size(), (1920, 1080));
        assert_eq!(RotatorParams::new(Transform::FlipH, 640, 480).output_size(), (640, 480));
        assert!(Transform::Rot270.swaps_axes());
    }
}
