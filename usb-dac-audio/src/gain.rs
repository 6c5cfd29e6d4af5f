//! Gain compositor: one Q8 gain factor per buffer.
//!
//! The factor is the product of three independently sourced terms, each in
//! [0, 1]:
//!
//! | Term | Source | Curve |
//! |------|--------|-------|
//! | Host volume | USB feature unit, dB in [-90, 0] | [`HOST_VOLUME_Q8`] (x⁵) |
//! | Power tier | USB-C current budget | [`POWER_TIER_Q8`] |
//! | Local volume | encoder, 0..=100 | quadratic, v²/100² |
//!
//! Local mute forces the factor to zero. Host mute is not folded in; it only
//! drives the DAC mute line (see [`PopSequencer`](crate::output::PopSequencer)).

use crate::dsp::tables::{HOST_VOLUME_Q8, POWER_TIER_Q8};

/// Host volume floor in dB.
pub const HOST_VOLUME_MIN_DB: i16 = -90;

/// Host volume ceiling in dB.
pub const HOST_VOLUME_MAX_DB: i16 = 0;

/// Local volume ceiling (unity).
pub const LOCAL_VOLUME_MAX: u8 = 100;

/// A combined gain factor in Q8, `0..=256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Gain(u16);

impl Gain {
    /// Silence.
    pub const ZERO: Gain = Gain(0);

    /// Unity gain (1.0).
    pub const UNITY: Gain = Gain(256);

    /// Create from a raw Q8 value, clamped to unity.
    pub const fn from_q8(q8: u16) -> Self {
        if q8 > Self::UNITY.0 {
            Self::UNITY
        } else {
            Gain(q8)
        }
    }

    /// Raw Q8 value.
    pub const fn q8(self) -> u16 {
        self.0
    }

    /// Linear scale factor.
    pub fn as_f32(self) -> f32 {
        self.0 as f32 * (1.0 / 256.0)
    }

    pub const fn is_unity(self) -> bool {
        self.0 == Self::UNITY.0
    }
}

/// Negotiated USB-C power budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerTier {
    /// Default USB power (500 mA): −6 dB.
    #[default]
    Low = 0,
    /// USB-C 1.5 A: −4 dB.
    Medium = 1,
    /// USB-C 3.0 A: −2 dB.
    High = 2,
}

impl PowerTier {
    /// Map a tier index from the power-detection collaborator. Out-of-range
    /// indices saturate to [`PowerTier::High`].
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => PowerTier::Low,
            1 => PowerTier::Medium,
            _ => PowerTier::High,
        }
    }

    /// Pre-scale for this tier, Q8.
    pub const fn scale_q8(self) -> u16 {
        POWER_TIER_Q8[self as usize]
    }
}

/// Host volume in dB mapped through the power curve, Q8.
pub fn host_volume_q8(db: i16) -> u16 {
    let db = db.clamp(HOST_VOLUME_MIN_DB, HOST_VOLUME_MAX_DB);
    HOST_VOLUME_Q8[(db - HOST_VOLUME_MIN_DB) as usize]
}

/// Local volume mapped through the quadratic curve, Q8.
pub fn local_volume_q8(volume: u8) -> u16 {
    let v = volume.min(LOCAL_VOLUME_MAX) as u32;
    ((v * v * 256) / (LOCAL_VOLUME_MAX as u32 * LOCAL_VOLUME_MAX as u32)) as u16
}

/// Local gain controls plus the current power tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainCompositor {
    local_volume: u8,
    local_muted: bool,
    power_tier: PowerTier,
}

impl GainCompositor {
    /// Unity local volume, unmuted, lowest power tier.
    pub const fn new() -> Self {
        GainCompositor {
            local_volume: LOCAL_VOLUME_MAX,
            local_muted: false,
            power_tier: PowerTier::Low,
        }
    }

    /// Set local attenuation, clamped to `0..=100`.
    pub fn set_local_volume(&mut self, volume: u8) {
        self.local_volume = volume.min(LOCAL_VOLUME_MAX);
    }

    pub fn local_volume(&self) -> u8 {
        self.local_volume
    }

    pub fn set_local_muted(&mut self, muted: bool) {
        self.local_muted = muted;
    }

    pub fn is_local_muted(&self) -> bool {
        self.local_muted
    }

    pub fn set_power_tier(&mut self, tier: PowerTier) {
        self.power_tier = tier;
    }

    pub fn power_tier(&self) -> PowerTier {
        self.power_tier
    }

    /// Combined gain for the next buffer given the host volume in dB.
    pub fn factor(&self, host_volume_db: i16) -> Gain {
        if self.local_muted {
            return Gain::ZERO;
        }

        let host = host_volume_q8(host_volume_db) as u32;
        let scaled = (host * self.power_tier.scale_q8() as u32) >> 8;
        let local = local_volume_q8(self.local_volume) as u32;
        Gain::from_q8(((scaled * local) >> 8) as u16)
    }
}

impl Default for GainCompositor {
    fn default() -> Self {
        Self::new()
    }
}
