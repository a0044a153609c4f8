//! Tessellation settings shared by every part constructor.

use crate::geom::Tolerance;

/// Default number of segments per quarter-circle fillet.
pub const DEFAULT_ARC_SEGMENTS: usize = 8;

/// Settings threaded through part construction.
///
/// `arc_segments` is the number of straight segments per 90° of arc. Full
/// circles (screw holes, click-lock pins) use four times that many.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    pub arc_segments: usize,
    pub tolerance: Tolerance,
}

impl ModelOptions {
    #[must_use]
    pub fn new(arc_segments: usize) -> Self {
        Self {
            arc_segments: arc_segments.max(1),
            ..Self::default()
        }
    }

    /// Segment count for a full circle.
    #[must_use]
    pub fn circle_segments(&self) -> usize {
        (self.arc_segments * 4).max(8)
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            arc_segments: DEFAULT_ARC_SEGMENTS,
            tolerance: Tolerance::WELD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_segments_are_raised_to_one() {
        let options = ModelOptions::new(0);
        assert_eq!(options.arc_segments, 1);
        assert_eq!(options.circle_segments(), 8);
        assert_eq!(ModelOptions::default().circle_segments(), 32);
    }
}
