//! Per-buffer sample rendering: unpack, gain and equalize.
//!
//! [`Renderer`] owns every piece of user-facing audio state (tone controls,
//! profiles, local volume, power tier). The scheduler hands it raw wire bytes
//! and gets processed frames back.

use log::{info, warn};

use crate::codec::unpack_frames;
use crate::config::Config;
use crate::eq::{Band, Equalizer};
use crate::error::ProfileError;
use crate::frame::Frame;
use crate::gain::{Gain, GainCompositor, PowerTier};
use crate::profile::{Profile, ProfileStore, OFF_NAME};
use crate::settings::Settings;

/// Audio processing state for one output stream.
#[derive(Debug, Clone)]
pub struct Renderer {
    swap_channels: bool,
    eq: Equalizer,
    gain: GainCompositor,
    profiles: ProfileStore,
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Renderer {
            swap_channels: config.swap_channels,
            eq: Equalizer::new(),
            gain: GainCompositor::new(),
            profiles: ProfileStore::new(),
        }
    }

    /// Unpack whole frames from `wire` into `frames`, then apply gain and EQ.
    /// Returns the number of frames produced.
    pub fn render(&mut self, wire: &[u8], frames: &mut [Frame], host_volume_db: i16) -> usize {
        let count = unpack_frames(wire, frames, self.swap_channels);
        let gain = self.gain.factor(host_volume_db);
        self.eq.process(&mut frames[..count], gain, &self.profiles);
        count
    }

    /// Gain factor the next buffer would use.
    pub fn gain_factor(&self, host_volume_db: i16) -> Gain {
        self.gain.factor(host_volume_db)
    }

    pub fn equalizer(&self) -> &Equalizer {
        &self.eq
    }

    /// Zero the active EQ strategy's filter state.
    pub fn reset_filters(&mut self) {
        self.eq.reset();
    }

    // ── Gain ────────────────────────────────────────────────────────────

    pub fn set_local_volume(&mut self, volume: u8) {
        self.gain.set_local_volume(volume);
    }

    pub fn local_volume(&self) -> u8 {
        self.gain.local_volume()
    }

    pub fn set_local_muted(&mut self, muted: bool) {
        self.gain.set_local_muted(muted);
    }

    pub fn is_local_muted(&self) -> bool {
        self.gain.is_local_muted()
    }

    pub fn set_power_tier(&mut self, tier: PowerTier) {
        self.gain.set_power_tier(tier);
    }

    pub fn power_tier(&self) -> PowerTier {
        self.gain.power_tier()
    }

    // ── Tone controls ───────────────────────────────────────────────────

    pub fn set_band(&mut self, band: Band, level: i8) {
        self.eq.set_band(band, level);
    }

    pub fn band(&self, band: Band) -> i8 {
        self.eq.band(band)
    }

    pub fn set_eq_enabled(&mut self, enabled: bool) {
        self.eq.set_enabled(enabled);
    }

    pub fn is_eq_enabled(&self) -> bool {
        self.eq.is_enabled()
    }

    // ── Profiles ────────────────────────────────────────────────────────

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Select profile `id`, or the tone controls on `None`.
    ///
    /// Out-of-range and empty slots are rejected and leave the current
    /// selection untouched. A successful call always restarts from zeroed
    /// filter state.
    pub fn set_active_profile(&mut self, id: Option<u8>) -> Result<(), ProfileError> {
        if let Some(slot) = id {
            if let Err(e) = self.check_slot(slot) {
                warn!("eq: rejected profile selection: {}", e);
                return Err(e);
            }
        }
        self.eq.activate(id);
        info!("eq: active profile {}", self.active_profile_name());
        Ok(())
    }

    fn check_slot(&self, slot: u8) -> Result<(), ProfileError> {
        if slot as usize >= crate::constants::MAX_PROFILES {
            Err(ProfileError::OutOfRange(slot))
        } else if !self.profiles.is_available(slot) {
            Err(ProfileError::Empty(slot))
        } else {
            Ok(())
        }
    }

    pub fn active_profile(&self) -> Option<u8> {
        self.eq.active_profile()
    }

    /// Name of the active profile, or `"OFF"`.
    pub fn active_profile_name(&self) -> &str {
        self.active_profile()
            .and_then(|slot| self.profiles.get(slot))
            .map_or(OFF_NAME, |p| p.name.as_str())
    }

    /// Write slot `id`. Rewriting the active slot restarts its filter state,
    /// or deactivates it if the new contents are empty.
    pub fn store_profile(&mut self, id: u8, profile: Profile) -> Result<(), ProfileError> {
        self.profiles.set(id, profile)?;
        if self.active_profile() == Some(id) {
            if self.profiles.is_available(id) {
                self.eq.activate(Some(id));
            } else {
                self.eq.activate(None);
            }
        }
        Ok(())
    }

    /// Clear slot `id`, deactivating it if active.
    pub fn delete_profile(&mut self, id: u8) -> Result<(), ProfileError> {
        self.profiles.delete(id)?;
        if self.active_profile() == Some(id) {
            self.eq.activate(None);
        }
        Ok(())
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Settings {
        Settings {
            local_volume: self.local_volume(),
            local_muted: self.is_local_muted(),
            bass: self.band(Band::Bass),
            treble: self.band(Band::Treble),
            active_profile: self.active_profile(),
        }
    }

    /// Apply persisted settings, clamping each field. An unavailable profile
    /// leaves the tone controls selected.
    pub fn restore(&mut self, settings: &Settings) {
        self.set_local_volume(settings.local_volume);
        self.set_local_muted(settings.local_muted);
        self.set_band(Band::Bass, settings.bass);
        self.set_band(Band::Treble, settings.treble);
        if self.set_active_profile(settings.active_profile).is_err() {
            self.eq.activate(None);
        }
    }
}
