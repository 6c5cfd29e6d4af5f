//! Sample and frame types shared by every stage of the pipeline.

/// One channel's amplitude: a signed 24-bit value held in an `i32` for headroom.
pub type Sample = i32;

/// One interleaved stereo frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub left: Sample,
    pub right: Sample,
}

impl Frame {
    /// Digital silence.
    pub const SILENCE: Frame = Frame { left: 0, right: 0 };

    pub const fn new(left: Sample, right: Sample) -> Self {
        Frame { left, right }
    }

    /// The same frame with left and right exchanged.
    pub const fn swapped(self) -> Self {
        Frame {
            left: self.right,
            right: self.left,
        }
    }
}
