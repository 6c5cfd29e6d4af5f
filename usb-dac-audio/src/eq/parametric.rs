//! Floating-point biquad cascade driven by a [`Profile`].
//!
//! Samples are normalised to [-1, 1), run through each active stage in
//! order (Direct Form II Transposed), then scaled by the pre-attenuation and
//! gain, clipped and returned to the 24-bit domain.

use libm::floorf;

use crate::constants::{MAX_FILTERS, SAMPLE_MAX, SAMPLE_MIN};
use crate::dsp::fixed::{PREATT_Q12, Q12_ONE};
use crate::frame::{Frame, Sample};
use crate::gain::Gain;
use crate::profile::{BiquadCoefficients, Profile};

/// 2^23: full scale of a 24-bit sample.
const SAMPLE_SCALE: f32 = 8_388_608.0;

/// The fixed-point pre-attenuation as a float so both engines agree.
pub const PREATT: f32 = PREATT_Q12 as f32 / Q12_ONE as f32;

/// DF2T delay line for one stage on one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    s1: f32,
    s2: f32,
}

impl BiquadState {
    pub const ZERO: BiquadState = BiquadState { s1: 0.0, s2: 0.0 };

    #[inline(always)]
    pub fn process(&mut self, c: &BiquadCoefficients, x: f32) -> f32 {
        let y = c.b0 * x + self.s1;
        self.s1 = c.b1 * x - c.a1 * y + self.s2;
        self.s2 = c.b2 * x - c.a2 * y;
        y
    }
}

/// Delay lines for every cascade position, `[stage][channel]`.
///
/// Positions are fixed: a skipped stage keeps its slot so later stages never
/// inherit another stage's history.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeState {
    stages: [[BiquadState; 2]; MAX_FILTERS],
}

impl CascadeState {
    pub const fn new() -> Self {
        CascadeState {
            stages: [[BiquadState::ZERO; 2]; MAX_FILTERS],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_clear(&self) -> bool {
        self.stages
            .iter()
            .flatten()
            .all(|s| *s == BiquadState::ZERO)
    }
}

impl Default for CascadeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale back to 24 bits, rounding toward negative infinity like the
/// fixed-point path.
#[inline(always)]
fn denormalize(y: f32, scale: f32) -> Sample {
    let out = y * scale;
    if out >= SAMPLE_MAX as f32 {
        SAMPLE_MAX
    } else if out <= SAMPLE_MIN as f32 {
        SAMPLE_MIN
    } else {
        floorf(out) as Sample
    }
}

/// Run `frames` through `profile`'s cascade in place.
pub fn process(state: &mut CascadeState, profile: &Profile, frames: &mut [Frame], gain: Gain) {
    let scale = PREATT * gain.as_f32() * SAMPLE_SCALE;

    for frame in frames.iter_mut() {
        let mut left = frame.left as f32 * (1.0 / SAMPLE_SCALE);
        let mut right = frame.right as f32 * (1.0 / SAMPLE_SCALE);

        for (filter, slot) in profile.filters.iter().zip(state.stages.iter_mut()) {
            if !filter.is_active() {
                continue;
            }
            left = slot[0].process(&filter.coeffs, left);
            right = slot[1].process(&filter.coeffs, right);
        }

        frame.left = denormalize(left, scale);
        frame.right = denormalize(right, scale);
    }
}
