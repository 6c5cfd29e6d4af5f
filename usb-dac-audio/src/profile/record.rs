//! Binary profile record shared with the PC authoring tool and storage.
//!
//! All fields little endian, no implicit padding:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 16 | name, NUL padded |
//! | 16 | 1 | filter count |
//! | 17 | 3 | reserved |
//! | 20 | 10 × 36 | filters |
//!
//! Each filter is `b0 b1 b2 a1 a2 freq gain q` as `f32`, then a type byte, an
//! enabled byte and two reserved bytes.

use crate::constants::{MAX_FILTERS, PROFILE_NAME_LEN};
use crate::error::ProfileError;

use super::{BiquadCoefficients, Filter, FilterKind, Profile, NAME_CAPACITY};

/// Size of one encoded filter.
pub const FILTER_RECORD_LEN: usize = 36;

const COUNT_OFFSET: usize = PROFILE_NAME_LEN;
const FILTERS_OFFSET: usize = COUNT_OFFSET + 4;

/// Size of one encoded profile.
pub const PROFILE_RECORD_LEN: usize = FILTERS_OFFSET + MAX_FILTERS * FILTER_RECORD_LEN;

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(word)
}

fn write_f32(bytes: &mut [u8], offset: usize, value: f32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

impl Filter {
    /// Decode one filter from exactly [`FILTER_RECORD_LEN`] bytes.
    pub fn from_record(bytes: &[u8; FILTER_RECORD_LEN]) -> Result<Self, ProfileError> {
        Ok(Filter {
            coeffs: BiquadCoefficients {
                b0: read_f32(bytes, 0),
                b1: read_f32(bytes, 4),
                b2: read_f32(bytes, 8),
                a1: read_f32(bytes, 12),
                a2: read_f32(bytes, 16),
            },
            freq_hz: read_f32(bytes, 20),
            gain_db: read_f32(bytes, 24),
            q: read_f32(bytes, 28),
            kind: FilterKind::try_from(bytes[32])?,
            enabled: bytes[33] != 0,
        })
    }

    pub fn to_record(&self) -> [u8; FILTER_RECORD_LEN] {
        let mut bytes = [0u8; FILTER_RECORD_LEN];
        write_f32(&mut bytes, 0, self.coeffs.b0);
        write_f32(&mut bytes, 4, self.coeffs.b1);
        write_f32(&mut bytes, 8, self.coeffs.b2);
        write_f32(&mut bytes, 12, self.coeffs.a1);
        write_f32(&mut bytes, 16, self.coeffs.a2);
        write_f32(&mut bytes, 20, self.freq_hz);
        write_f32(&mut bytes, 24, self.gain_db);
        write_f32(&mut bytes, 28, self.q);
        bytes[32] = self.kind.into();
        bytes[33] = self.enabled as u8;
        bytes
    }
}

impl Profile {
    /// Decode a profile record.
    ///
    /// The name ends at the first NUL and is cut to [`NAME_CAPACITY`] bytes. A
    /// filter count above the cascade limit is clamped. Filter slots past the
    /// count are not decoded.
    pub fn from_record(bytes: &[u8]) -> Result<Self, ProfileError> {
        if bytes.len() < PROFILE_RECORD_LEN {
            return Err(ProfileError::Truncated(bytes.len()));
        }

        let field = &bytes[..NAME_CAPACITY];
        let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        let name = core::str::from_utf8(&field[..end]).map_err(|_| ProfileError::InvalidName)?;

        let mut profile = Profile::new();
        profile.set_name(name);

        let count = (bytes[COUNT_OFFSET] as usize).min(MAX_FILTERS);
        for chunk in bytes[FILTERS_OFFSET..PROFILE_RECORD_LEN]
            .chunks_exact(FILTER_RECORD_LEN)
            .take(count)
        {
            let mut raw = [0u8; FILTER_RECORD_LEN];
            raw.copy_from_slice(chunk);
            // Bounded by `take(count)` with count <= MAX_FILTERS.
            let _ = profile.filters.push(Filter::from_record(&raw)?);
        }

        Ok(profile)
    }

    /// Encode as a record. Unused filter slots are zero.
    pub fn to_record(&self) -> [u8; PROFILE_RECORD_LEN] {
        let mut bytes = [0u8; PROFILE_RECORD_LEN];
        let name = self.name.as_bytes();
        bytes[..name.len()].copy_from_slice(name);
        bytes[COUNT_OFFSET] = self.filters.len() as u8;

        for (filter, chunk) in self
            .filters
            .iter()
            .zip(bytes[FILTERS_OFFSET..].chunks_exact_mut(FILTER_RECORD_LEN))
        {
            chunk.copy_from_slice(&filter.to_record());
        }
        bytes
    }
}
