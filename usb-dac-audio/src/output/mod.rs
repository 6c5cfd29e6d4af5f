//! Double-buffered output: fill scheduling and pop-free sink control.
//!
//! ## Architecture
//!
//! ```text
//!  HostStream            Scheduler (task)                 OutputSink (DMA)
//! ┌──────────┐ bytes  ┌─────────────────────────┐ words ┌─────────────────┐
//! │ USB FIFO ├───────►│ unpack → gain → EQ →    ├──────►│ First │ Second  │
//! └──────────┘        │ interleave / hold-pad   │       └───┬───────┬─────┘
//!                     └───────────▲─────────────┘        half│   full│
//!                                 │  needs_fill              ▼       ▼
//!                                 └──────────────────── FillFlags (ISR)
//! ```
//!
//! The sink plays the two halves in a loop. Each completion notification
//! flags the half that just finished; the scheduler refills flagged halves
//! from the cooperative task loop. [`PopSequencer`] owns the DAC mute and
//! amplifier enable lines and is the only code that starts or stops the sink.

pub mod flags;
pub mod scheduler;
pub mod sequencer;

#[cfg(test)]
mod integration_tests;

pub use flags::FillFlags;
pub use scheduler::Scheduler;
pub use sequencer::PopSequencer;

use crate::constants::WORDS_PER_HALF;

/// One half of the output ring, in I2S slot words.
pub type HalfBuffer = [u32; WORDS_PER_HALF];

/// Half-buffer selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    First = 0,
    Second = 1,
}

impl Half {
    /// Both halves in playback order.
    pub const ALL: [Half; 2] = [Half::First, Half::Second];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The opposite half.
    pub const fn other(self) -> Half {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }
}

/// Cyclic hardware output (I2S + circular DMA).
///
/// The sink owns the DMA memory. While running it plays the halves in order,
/// forever, and reports completions through [`FillFlags`].
pub trait OutputSink {
    type Error: core::fmt::Debug;

    /// Mutable view of one half for refilling.
    fn half_mut(&mut self, half: Half) -> &mut HalfBuffer;

    /// Start cyclic playback from the first half.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Stop playback.
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// Stream state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// No host stream; the sink plays silence.
    #[default]
    Idle,
    /// Accumulating host data before real playback starts.
    Prebuffering,
    /// Refilling halves as they complete.
    Streaming,
}

/// Fill outcome counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStats {
    /// Halves filled entirely from host data.
    pub full_fills: u32,
    /// Halves filled partly from host data and hold-padded.
    pub partial_fills: u32,
    /// Halves filled entirely by holding the last frame.
    pub underruns: u32,
}

impl StreamStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total halves serviced.
    pub fn fills(&self) -> u32 {
        self.full_fills + self.partial_fills + self.underruns
    }
}
