//! Host audio transport seam.
//!
//! The USB audio class driver owns enumeration and the endpoint FIFO. The
//! pipeline only pulls bytes and reads the host's feature-unit controls.

use crate::constants::SAMPLE_RATE_HZ;

/// Source of packed 24-bit host audio.
///
/// Implemented by the USB audio class driver (or a mock in tests).
pub trait HostStream {
    /// Bytes currently buffered and readable without blocking.
    fn available(&self) -> usize;

    /// Move up to `buf.len()` bytes into `buf`. Returns the count moved.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Host volume in dB. Values outside [-90, 0] are clamped by the gain
    /// compositor.
    fn volume_db(&self) -> i16;

    /// Negotiated sample rate in Hz.
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE_HZ
    }
}

impl<T: HostStream + ?Sized> HostStream for &mut T {
    fn available(&self) -> usize {
        (**self).available()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }

    fn volume_db(&self) -> i16 {
        (**self).volume_db()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}
