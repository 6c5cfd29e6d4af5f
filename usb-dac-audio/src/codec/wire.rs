//! Packed 24-bit little-endian wire format.
//!
//! Each sample is three bytes, least significant first. A frame is six bytes
//! (left then right). Bytes that do not make up a whole frame are never
//! consumed.

use crate::constants::{BYTES_PER_FRAME, BYTES_PER_SAMPLE};
use crate::frame::{Frame, Sample};

/// Sign-extend one packed sample.
#[inline(always)]
pub fn unpack_sample(bytes: [u8; BYTES_PER_SAMPLE]) -> Sample {
    let raw = bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16;
    ((raw << 8) as i32) >> 8
}

/// Pack bits [23:0] of `sample`.
#[inline(always)]
pub fn pack_sample(sample: Sample) -> [u8; BYTES_PER_SAMPLE] {
    [sample as u8, (sample >> 8) as u8, (sample >> 16) as u8]
}

/// Largest byte count not exceeding `bytes` that holds only whole frames.
#[inline]
pub const fn whole_frame_bytes(bytes: usize) -> usize {
    bytes - bytes % BYTES_PER_FRAME
}

/// Unpack whole frames from `src` into `dest`, optionally swapping channels.
///
/// Returns the number of frames written: the smaller of the whole frames in
/// `src` and `dest.len()`. A trailing partial frame is ignored.
pub fn unpack_frames(src: &[u8], dest: &mut [Frame], swap: bool) -> usize {
    let mut count = 0;
    for (frame, chunk) in dest.iter_mut().zip(src.chunks_exact(BYTES_PER_FRAME)) {
        let left = unpack_sample([chunk[0], chunk[1], chunk[2]]);
        let right = unpack_sample([chunk[3], chunk[4], chunk[5]]);
        let unpacked = Frame::new(left, right);
        *frame = if swap { unpacked.swapped() } else { unpacked };
        count += 1;
    }
    count
}

/// Pack `src` into `dest` in wire order. Returns the number of frames written.
pub fn pack_frames(src: &[Frame], dest: &mut [u8]) -> usize {
    let mut count = 0;
    for (frame, chunk) in src.iter().zip(dest.chunks_exact_mut(BYTES_PER_FRAME)) {
        chunk[..BYTES_PER_SAMPLE].copy_from_slice(&pack_sample(frame.left));
        chunk[BYTES_PER_SAMPLE..].copy_from_slice(&pack_sample(frame.right));
        count += 1;
    }
    count
}
