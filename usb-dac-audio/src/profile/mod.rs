//! Parametric EQ profiles.
//!
//! A [`Profile`] is a named, ordered cascade of up to
//! [`MAX_FILTERS`](crate::constants::MAX_FILTERS) biquad [`Filter`]s. The
//! coefficients are authored elsewhere (the PC tool, or [`design`] on
//! device); frequency, gain and Q travel along for display only.
//!
//! [`ProfileStore`] holds the fixed set of slots the UI and persistence
//! collaborators edit. [`record`] is the binary form they exchange.

pub mod design;
pub mod record;

pub use record::{FILTER_RECORD_LEN, PROFILE_RECORD_LEN};

use heapless::{String, Vec};

use crate::constants::{MAX_FILTERS, MAX_PROFILES, PROFILE_NAME_LEN};
use crate::error::ProfileError;

/// Longest profile name in bytes. One byte of the record field is the NUL.
pub const NAME_CAPACITY: usize = PROFILE_NAME_LEN - 1;

/// Name shown when no profile is active.
pub const OFF_NAME: &str = "OFF";

/// Profile name, bounded to [`NAME_CAPACITY`] bytes.
pub type ProfileName = String<NAME_CAPACITY>;

/// Filter response shape. The discriminant is the record's type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FilterKind {
    /// Stage is skipped.
    #[default]
    Off = 0,
    Bell = 1,
    LowShelf = 2,
    HighShelf = 3,
    LowPass = 4,
    HighPass = 5,
}

impl TryFrom<u8> for FilterKind {
    type Error = ProfileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FilterKind::Off),
            1 => Ok(FilterKind::Bell),
            2 => Ok(FilterKind::LowShelf),
            3 => Ok(FilterKind::HighShelf),
            4 => Ok(FilterKind::LowPass),
            5 => Ok(FilterKind::HighPass),
            other => Err(ProfileError::UnknownFilterType(other)),
        }
    }
}

impl From<FilterKind> for u8 {
    fn from(kind: FilterKind) -> u8 {
        kind as u8
    }
}

/// Normalised biquad coefficients (`a0` is implicitly 1).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through stage.
    pub const IDENTITY: BiquadCoefficients = BiquadCoefficients {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub const fn new(b0: f32, b1: f32, b2: f32, a1: f32, a2: f32) -> Self {
        BiquadCoefficients { b0, b1, b2, a1, a2 }
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One cascade stage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Filter {
    pub kind: FilterKind,
    pub enabled: bool,
    pub coeffs: BiquadCoefficients,
    /// Centre or corner frequency in Hz.
    pub freq_hz: f32,
    /// Gain in dB.
    pub gain_db: f32,
    pub q: f32,
}

impl Filter {
    /// An enabled stage with the given coefficients and display metadata.
    pub const fn new(
        kind: FilterKind,
        coeffs: BiquadCoefficients,
        freq_hz: f32,
        gain_db: f32,
        q: f32,
    ) -> Self {
        Filter {
            kind,
            enabled: true,
            coeffs,
            freq_hz,
            gain_db,
            q,
        }
    }

    /// Whether the stage contributes to the cascade.
    pub fn is_active(&self) -> bool {
        self.enabled && self.kind != FilterKind::Off
    }
}

/// A named biquad cascade.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    pub name: ProfileName,
    pub filters: Vec<Filter, MAX_FILTERS>,
}

impl Profile {
    /// An empty profile.
    pub const fn new() -> Self {
        Profile {
            name: String::new(),
            filters: Vec::new(),
        }
    }

    /// Build a profile, truncating `name` to [`NAME_CAPACITY`] bytes on a
    /// character boundary and `filters` to the cascade limit.
    pub fn from_parts(name: &str, filters: &[Filter]) -> Self {
        let mut profile = Profile::new();
        profile.set_name(name);
        for filter in filters.iter().take(MAX_FILTERS) {
            // Bounded by `take` above.
            let _ = profile.filters.push(*filter);
        }
        profile
    }

    /// Replace the name, truncating on a character boundary.
    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for c in name.chars() {
            if self.name.push(c).is_err() {
                break;
            }
        }
    }

    /// A profile with no name or no filters occupies no slot.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() || self.filters.is_empty()
    }
}

/// The fixed set of profile slots.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    slots: [Profile; MAX_PROFILES],
}

impl ProfileStore {
    /// All slots empty.
    pub const fn new() -> Self {
        const EMPTY: Profile = Profile::new();
        ProfileStore {
            slots: [EMPTY; MAX_PROFILES],
        }
    }

    /// The profile in slot `id`, or `None` when out of range or empty.
    pub fn get(&self, id: u8) -> Option<&Profile> {
        self.slots.get(id as usize).filter(|p| !p.is_empty())
    }

    /// Whether slot `id` exists and holds a profile.
    pub fn is_available(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    /// Overwrite slot `id`. Storing an empty profile clears the slot.
    pub fn set(&mut self, id: u8, profile: Profile) -> Result<(), ProfileError> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(ProfileError::OutOfRange(id))?;
        *slot = profile;
        Ok(())
    }

    /// Clear slot `id`.
    pub fn delete(&mut self, id: u8) -> Result<(), ProfileError> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(ProfileError::OutOfRange(id))?;
        *slot = Profile::new();
        Ok(())
    }

    /// Number of non-empty slots.
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|p| !p.is_empty()).count()
    }

    /// Ids and profiles of all non-empty slots.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Profile)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_empty())
            .map(|(id, p)| (id as u8, p))
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}
