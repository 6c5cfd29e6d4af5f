//! Persisted user settings.
//!
//! The settings collaborator reads a [`Settings`] snapshot on its own
//! schedule and hands one back once at startup, before streaming begins.

use crate::gain::LOCAL_VOLUME_MAX;

/// User-adjustable state that survives a power cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Local attenuation, `0..=100`.
    pub local_volume: u8,
    pub local_muted: bool,
    /// Bass level, `-6..=6`.
    pub bass: i8,
    /// Treble level, `-6..=6`.
    pub treble: i8,
    /// Active profile slot, `None` for the tone controls.
    pub active_profile: Option<u8>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            local_volume: LOCAL_VOLUME_MAX,
            local_muted: false,
            bass: 0,
            treble: 0,
            active_profile: None,
        }
    }
}
