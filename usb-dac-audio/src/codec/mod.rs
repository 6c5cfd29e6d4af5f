//! Sample codec: wire format in, I2S slot words out.
//!
//! | Direction | Module | Format |
//! |-----------|--------|--------|
//! | Host → pipeline | [`wire`] | packed 3-byte little-endian signed samples, L R L R … |
//! | Pipeline → sink | [`slot`] | 24-bit sample MSB-aligned in a 32-bit I2S slot |
//!
//! The codec only works on whole stereo frames. Neither module holds state.

pub mod slot;
pub mod wire;

pub use slot::{fill_hold, interleave, silence};
pub use wire::{pack_frames, unpack_frames, whole_frame_bytes};
