//! # usb-dac-audio
//!
//! A `no_std`, zero-allocation audio core for a USB DAC. Packed 24-bit host
//! audio comes in and 32-bit I2S slot words go out to a double-buffered DMA
//! sink, with gain, a two-band tone control or a parametric biquad cascade in
//! between. Pop-free sequencing of the DAC mute line and amplifier enable is
//! built in.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Types | [`frame`] / [`constants`] / [`config`] | Frames, fixed sizes, construction-time config |
//! | Codec | [`codec`] | Wire bytes ↔ frames ↔ I2S slot words |
//! | DSP | [`dsp`] | Q12 split multiply, saturation, lookup tables |
//! | EQ | [`eq`] / [`profile`] | Two-band and parametric engines, profile store |
//! | Gain | [`gain`] | Host volume × power tier × local volume |
//! | Output | [`output`] | Fill flags, scheduler, pop sequencer |
//! | Seams | [`host`] / [`output::OutputSink`] | USB transport and DMA sink traits |
//! | Context | [`render`] / [`pipeline`] / [`settings`] | Owned state and the public entry point |
//!
//! ## Quick start
//!
//! ```ignore
//! use usb_dac_audio::{Config, FillFlags, Pipeline};
//!
//! static FLAGS: FillFlags = FillFlags::new();
//!
//! let mut pipeline = Pipeline::new(&FLAGS, usb, i2s, dac_mute, amp_en, delay, Config::default());
//! pipeline.init()?;
//!
//! // DMA ISRs:
//! FLAGS.on_half_complete();
//! FLAGS.on_transfer_complete();
//!
//! // Main loop:
//! loop {
//!     pipeline.task()?;
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `swap-channels` | yes | Swap left/right right after unpacking |
//! | `serde` | no | `Serialize`/`Deserialize` on settings and profiles |
//!
//! ## Audio parameters
//!
//! - **Half-buffer:** 240 frames, 5 ms ([`constants::FRAMES_PER_HALF`])
//! - **Sample rate:** 48 000 Hz ([`constants::SAMPLE_RATE_HZ`])
//! - **Sample format:** signed 24-bit in an `i32`
//! - **Prebuffer:** 3 half-buffers ([`constants::PREBUFFER_HALVES`])

#![no_std]

pub mod codec;
pub mod config;
pub mod constants;
pub mod dsp;
pub mod eq;
pub mod error;
pub mod frame;
pub mod gain;
pub mod host;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod render;
pub mod settings;

pub use config::Config;
pub use error::{Error, ProfileError};
pub use frame::{Frame, Sample};
pub use host::HostStream;
pub use output::{FillFlags, Half, HalfBuffer, OutputSink, StreamState, StreamStats};
pub use pipeline::Pipeline;
pub use settings::Settings;
