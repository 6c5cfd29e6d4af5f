//! Fixed-point bass/treble tone control.
//!
//! Bass is a band boost or cut around 50–180 Hz: a first-order highpass at
//! ~50 Hz feeds two cascaded first-order lowpasses at ~180 Hz, and the result
//! is added to (or subtracted from) the dry signal. Treble is the residual of
//! a first-order lowpass at ~1.7 kHz, added or subtracted the same way.
//!
//! Every multiply is [`mul_q12`] so the whole path runs in 32-bit integers.

use crate::dsp::fixed::{mul_q12, saturate24, scale_q8, PREATT_Q12};
use crate::dsp::tables::BAND_GAIN_Q12;
use crate::frame::{Frame, Sample};
use crate::gain::Gain;

/// Sub-bass highpass smoothing coefficient (~50 Hz).
const BASS_HP_ALPHA: i32 = 27;
const BASS_HP_BETA: i32 = 4069;

/// Bass band lowpass coefficient (~180 Hz), used by both stages.
const BASS_LP_ALPHA: i32 = 95;
const BASS_LP_BETA: i32 = 4001;

/// Treble split lowpass coefficient (~1.7 kHz).
const TREBLE_LP_ALPHA: i32 = 817;
const TREBLE_LP_BETA: i32 = 3279;

/// Offset added to the user's bass level so that "0" is a mild lift.
pub const BASS_OFFSET: i8 = 1;

/// One-pole lowpass update: `state = in·α + state·β`.
#[inline(always)]
fn one_pole(state: &mut i32, input: i32, alpha: i32, beta: i32) -> i32 {
    *state = mul_q12(input, alpha) + mul_q12(*state, beta);
    *state
}

/// Per-channel filter accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    bass_hp: i32,
    bass_lp1: i32,
    bass_lp2: i32,
    treble_lp: i32,
}

impl ChannelState {
    fn bass(&mut self, input: i32, gain: i32, boost: bool) -> i32 {
        let hp = input - one_pole(&mut self.bass_hp, input, BASS_HP_ALPHA, BASS_HP_BETA);
        let lp1 = one_pole(&mut self.bass_lp1, hp, BASS_LP_ALPHA, BASS_LP_BETA);
        let lp2 = one_pole(&mut self.bass_lp2, lp1, BASS_LP_ALPHA, BASS_LP_BETA);
        let band = mul_q12(lp2, gain);
        if boost {
            input + band
        } else {
            input - band
        }
    }

    fn treble(&mut self, input: i32, gain: i32, boost: bool) -> i32 {
        let hp = input - one_pole(&mut self.treble_lp, input, TREBLE_LP_ALPHA, TREBLE_LP_BETA);
        let band = mul_q12(hp, gain);
        if boost {
            input + band
        } else {
            input - band
        }
    }
}

/// Filter state for both channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TwoBandState {
    left: ChannelState,
    right: ChannelState,
}

impl TwoBandState {
    pub const fn new() -> Self {
        const ZERO: ChannelState = ChannelState {
            bass_hp: 0,
            bass_lp1: 0,
            bass_lp2: 0,
            treble_lp: 0,
        };
        TwoBandState {
            left: ZERO,
            right: ZERO,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether every accumulator is zero.
    pub fn is_clear(&self) -> bool {
        *self == Self::new()
    }
}

/// Whether the given levels leave the signal unshaped.
///
/// The bass offset makes a user level of −1 the neutral point.
pub fn is_neutral(bass: i8, treble: i8) -> bool {
    bass == -BASS_OFFSET && treble == 0
}

/// Band gains derived from the user levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shaping {
    bass: i8,
    bass_gain: i32,
    treble: i8,
    treble_gain: i32,
}

impl Shaping {
    fn new(bass: i8, treble: i8) -> Self {
        let bass = bass + BASS_OFFSET;
        let g = BAND_GAIN_Q12[bass.unsigned_abs() as usize];
        // 3x on bass, 1.25x on treble.
        let bass_gain = (g << 1) + g;
        let g = BAND_GAIN_Q12[treble.unsigned_abs() as usize];
        let treble_gain = g + (g >> 2);
        Shaping {
            bass,
            bass_gain,
            treble,
            treble_gain,
        }
    }

    #[inline(always)]
    fn apply(&self, state: &mut ChannelState, sample: Sample, gain: Gain) -> Sample {
        let mut out = mul_q12(sample, PREATT_Q12);
        if self.bass != 0 {
            out = state.bass(out, self.bass_gain, self.bass > 0);
        }
        if self.treble != 0 {
            out = state.treble(out, self.treble_gain, self.treble > 0);
        }
        let out = saturate24(out);
        if gain.is_unity() {
            out
        } else {
            scale_q8(out, gain.q8())
        }
    }
}

/// Shape `frames` in place with bass and treble levels in `-6..=6`.
///
/// Callers route neutral levels to the flat path instead (see
/// [`is_neutral`]).
pub fn process(state: &mut TwoBandState, bass: i8, treble: i8, frames: &mut [Frame], gain: Gain) {
    let shaping = Shaping::new(bass, treble);
    for frame in frames.iter_mut() {
        frame.left = shaping.apply(&mut state.left, frame.left, gain);
        frame.right = shaping.apply(&mut state.right, frame.right, gain);
    }
}
