/// Stereo frames per half-buffer (5 ms at 48 kHz).
pub const FRAMES_PER_HALF: usize = 240;

/// Interleaved channels per frame.
pub const CHANNELS: usize = 2;

/// Output sample rate in Hz. Processing assumes the host stream matches it.
pub const SAMPLE_RATE_HZ: u32 = 48_000;

/// Packed little-endian bytes per wire sample.
pub const BYTES_PER_SAMPLE: usize = 3;

/// Packed bytes per stereo frame on the wire.
pub const BYTES_PER_FRAME: usize = BYTES_PER_SAMPLE * CHANNELS;

/// Wire bytes needed to fill one half-buffer.
pub const WIRE_BYTES_PER_HALF: usize = FRAMES_PER_HALF * BYTES_PER_FRAME;

/// 32-bit I2S slot words per half-buffer (one word per channel).
pub const WORDS_PER_HALF: usize = FRAMES_PER_HALF * CHANNELS;

/// Half-buffers worth of host data accumulated before the sink starts.
pub const PREBUFFER_HALVES: usize = 3;

/// Largest 24-bit signed sample.
pub const SAMPLE_MAX: i32 = 8_388_607;

/// Smallest 24-bit signed sample.
pub const SAMPLE_MIN: i32 = -8_388_608;

/// Whether left and right are swapped right after unpacking.
pub const SWAP_CHANNELS: bool = cfg!(feature = "swap-channels");

/// Time the DAC output is left to settle before the amplifier is enabled.
pub const AMP_SETTLE_MS: u32 = 500;

/// Number of EQ profile slots.
pub const MAX_PROFILES: usize = 10;

/// Maximum biquad stages per profile.
pub const MAX_FILTERS: usize = 10;

/// Profile name field width in the binary record, including the NUL.
pub const PROFILE_NAME_LEN: usize = 16;
