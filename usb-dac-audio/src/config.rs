//! Construction-time pipeline configuration.
//!
//! Values here are fixed once the [`Pipeline`](crate::pipeline::Pipeline) is
//! built. Defaults come from [`constants`](crate::constants) and the
//! `swap-channels` cargo feature.

use crate::constants::{AMP_SETTLE_MS, PREBUFFER_HALVES, SWAP_CHANNELS, WIRE_BYTES_PER_HALF};

/// Fixed pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Swap left/right immediately after unpacking host data.
    pub swap_channels: bool,
    /// Half-buffers of host data required before leaving prebuffering.
    pub prebuffer_halves: usize,
    /// Settle delay between unmuting the DAC and enabling the amplifier.
    pub amp_settle_ms: u32,
}

impl Config {
    /// Prebuffer threshold in wire bytes. Never less than one half-buffer.
    pub const fn prebuffer_bytes(&self) -> usize {
        let halves = if self.prebuffer_halves == 0 {
            1
        } else {
            self.prebuffer_halves
        };
        halves * WIRE_BYTES_PER_HALF
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            swap_channels: SWAP_CHANNELS,
            prebuffer_halves: PREBUFFER_HALVES,
            amp_settle_ms: AMP_SETTLE_MS,
        }
    }
}
