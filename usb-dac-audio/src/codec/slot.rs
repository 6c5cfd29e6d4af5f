//! 32-bit I2S slot words for the output half-buffers.
//!
//! ## Slot format
//!
//! Each channel occupies one `u32`: the 24-bit sample sits in bits 31..8 and
//! bits 7..0 are zero. Words alternate left, right, left, right.
//!
//! ```text
//!  31                    8 7      0
//! ┌───────────────────────┬────────┐
//! │  sample[23:0]         │ 0x00   │
//! └───────────────────────┴────────┘
//! ```

use crate::constants::CHANNELS;
use crate::frame::{Frame, Sample};

/// MSB-align one sample into a slot word.
#[inline(always)]
pub const fn to_slot(sample: Sample) -> u32 {
    (sample as u32) << 8
}

/// Recover the sign-extended sample from a slot word.
#[inline(always)]
pub const fn from_slot(word: u32) -> Sample {
    (word as i32) >> 8
}

/// Interleave `frames` into slot words.
///
/// # Panics
///
/// Debug-asserts that `dest` holds exactly two words per frame.
pub fn interleave(dest: &mut [u32], frames: &[Frame]) {
    debug_assert_eq!(dest.len(), frames.len() * CHANNELS);

    for (words, frame) in dest.chunks_exact_mut(CHANNELS).zip(frames) {
        words[0] = to_slot(frame.left);
        words[1] = to_slot(frame.right);
    }
}

/// Fill `dest` by repeating `frame`.
pub fn fill_hold(dest: &mut [u32], frame: Frame) {
    let left = to_slot(frame.left);
    let right = to_slot(frame.right);
    for words in dest.chunks_exact_mut(CHANNELS) {
        words[0] = left;
        words[1] = right;
    }
}

/// Fill `dest` with silence.
pub fn silence(dest: &mut [u32]) {
    dest.fill(0);
}

/// Split slot words back into frames. Returns the number of frames written.
pub fn deinterleave(src: &[u32], dest: &mut [Frame]) -> usize {
    let mut count = 0;
    for (frame, words) in dest.iter_mut().zip(src.chunks_exact(CHANNELS)) {
        *frame = Frame::new(from_slot(words[0]), from_slot(words[1]));
        count += 1;
    }
    count
}
