//! Equalizer strategy selection.
//!
//! Exactly one engine shapes each buffer:
//!
//! | Strategy | When | Engine |
//! |----------|------|--------|
//! | [`Strategy::Parametric`] | a profile is active | [`parametric`] |
//! | [`Strategy::TwoBand`] | tone enabled | [`two_band`] |
//! | [`Strategy::Flat`] | tone disabled | [`flat`] |
//!
//! An active profile overrides the tone controls entirely; band levels set
//! while a profile is active are stored and take effect once it is cleared.
//! Entering a strategy always starts from zeroed filter state. At the
//! neutral levels the two-band engine passes audio through flat but keeps its
//! accumulators, so crossing the neutral point does not reset them.

pub mod parametric;
pub mod two_band;

use log::debug;

use crate::dsp::fixed::{mul_q12, scale_q8, PREATT_Q12};
use crate::frame::Frame;
use crate::gain::Gain;
use crate::profile::ProfileStore;

pub use parametric::CascadeState;
pub use two_band::TwoBandState;

/// Lowest band level.
pub const BAND_MIN: i8 = -6;

/// Highest band level.
pub const BAND_MAX: i8 = 6;

/// Tone-control band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Bass,
    Treble,
}

/// User-facing tone settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneControls {
    pub bass: i8,
    pub treble: i8,
    pub enabled: bool,
}

impl ToneControls {
    pub const fn new() -> Self {
        ToneControls {
            bass: 0,
            treble: 0,
            enabled: true,
        }
    }

    /// Whether the two-band engine would leave the signal unshaped.
    pub fn is_bypassed(&self) -> bool {
        !self.enabled || two_band::is_neutral(self.bass, self.treble)
    }
}

impl Default for ToneControls {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine currently shaping audio, with its filter state.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Flat,
    TwoBand(TwoBandState),
    Parametric { slot: u8, state: CascadeState },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Flat => "flat",
            Strategy::TwoBand(_) => "two-band",
            Strategy::Parametric { .. } => "parametric",
        }
    }

    fn reset(&mut self) {
        match self {
            Strategy::Flat => {}
            Strategy::TwoBand(state) => state.reset(),
            Strategy::Parametric { state, .. } => state.reset(),
        }
    }

    /// Whether the strategy holds no filter history.
    pub fn is_clear(&self) -> bool {
        match self {
            Strategy::Flat => true,
            Strategy::TwoBand(state) => state.is_clear(),
            Strategy::Parametric { state, .. } => state.is_clear(),
        }
    }
}

/// Pre-attenuation and gain only.
pub fn flat(frames: &mut [Frame], gain: Gain) {
    let g = gain.q8();
    for frame in frames.iter_mut() {
        frame.left = scale_q8(mul_q12(frame.left, PREATT_Q12), g);
        frame.right = scale_q8(mul_q12(frame.right, PREATT_Q12), g);
    }
}

/// Tone controls plus the active strategy.
#[derive(Debug, Clone)]
pub struct Equalizer {
    tone: ToneControls,
    strategy: Strategy,
}

impl Equalizer {
    /// Tone enabled at level 0 on both bands, no profile.
    pub fn new() -> Self {
        let mut eq = Equalizer {
            tone: ToneControls::new(),
            strategy: Strategy::Flat,
        };
        eq.select_tone_strategy();
        eq
    }

    pub fn tone(&self) -> ToneControls {
        self.tone
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Set a band level, clamped to [`BAND_MIN`]..=[`BAND_MAX`].
    ///
    /// Filter state carries over while the two-band engine stays selected.
    pub fn set_band(&mut self, band: Band, level: i8) {
        let level = level.clamp(BAND_MIN, BAND_MAX);
        match band {
            Band::Bass => self.tone.bass = level,
            Band::Treble => self.tone.treble = level,
        }
        self.select_tone_strategy();
    }

    pub fn band(&self, band: Band) -> i8 {
        match band {
            Band::Bass => self.tone.bass,
            Band::Treble => self.tone.treble,
        }
    }

    /// Enable or bypass the tone controls. Disabling drops their state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.tone.enabled = enabled;
        self.select_tone_strategy();
    }

    pub fn is_enabled(&self) -> bool {
        self.tone.enabled
    }

    /// Switch to profile `slot`, or back to the tone controls on `None`.
    ///
    /// Always starts from zeroed state, including when `slot` is already
    /// active. Slot validity is the caller's concern.
    pub fn activate(&mut self, slot: Option<u8>) {
        self.strategy = match slot {
            Some(slot) => Strategy::Parametric {
                slot,
                state: CascadeState::new(),
            },
            None => Strategy::Flat,
        };
        self.select_tone_strategy();
        debug!("eq: {} strategy", self.strategy.name());
    }

    pub fn active_profile(&self) -> Option<u8> {
        match self.strategy {
            Strategy::Parametric { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// Zero the active strategy's filter state.
    pub fn reset(&mut self) {
        self.strategy.reset();
    }

    /// Shape `frames` in place and apply `gain`.
    ///
    /// A parametric slot that has since become empty processes flat.
    pub fn process(&mut self, frames: &mut [Frame], gain: Gain, profiles: &ProfileStore) {
        let ToneControls { bass, treble, .. } = self.tone;
        match &mut self.strategy {
            Strategy::Flat => flat(frames, gain),
            Strategy::TwoBand(_) if two_band::is_neutral(bass, treble) => flat(frames, gain),
            Strategy::TwoBand(state) => two_band::process(state, bass, treble, frames, gain),
            Strategy::Parametric { slot, state } => match profiles.get(*slot) {
                Some(profile) => parametric::process(state, profile, frames, gain),
                None => flat(frames, gain),
            },
        }
    }

    fn select_tone_strategy(&mut self) {
        let next = match (&self.strategy, !self.tone.enabled) {
            (Strategy::Parametric { .. }, _) => None,
            (Strategy::Flat, true) | (Strategy::TwoBand(_), false) => None,
            (Strategy::TwoBand(_), true) => Some(Strategy::Flat),
            (Strategy::Flat, false) => Some(Strategy::TwoBand(TwoBandState::new())),
        };
        if let Some(next) = next {
            self.strategy = next;
            debug!("eq: {} strategy", self.strategy.name());
        }
    }
}

impl Default for Equalizer {
    fn default() -> Self {
        Self::new()
    }
}
