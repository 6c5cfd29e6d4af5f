//! Error types.
//!
//! Data starvation and fixed-point overflow are not errors: starvation is
//! absorbed by hold-padding and overflow is prevented structurally. What is
//! left are rejected profile operations and hardware failures.

use thiserror::Error;

use crate::constants::MAX_PROFILES;
use crate::profile::PROFILE_RECORD_LEN;

/// Rejected profile store or profile selection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// Slot index is not below [`MAX_PROFILES`].
    #[error("profile slot {0} out of range (max {max})", max = MAX_PROFILES)]
    OutOfRange(u8),
    /// Slot holds no filters or no name.
    #[error("profile slot {0} is empty")]
    Empty(u8),
    /// Binary record shorter than [`PROFILE_RECORD_LEN`].
    #[error("profile record is {0} bytes, expected {len}", len = PROFILE_RECORD_LEN)]
    Truncated(usize),
    /// Filter type byte outside the known set.
    #[error("unknown filter type {0}")]
    UnknownFilterType(u8),
    /// Name field is not valid UTF-8.
    #[error("profile name is not valid UTF-8")]
    InvalidName,
}

/// Hardware failure while driving the output sink or a control pin.
#[derive(Debug, Error)]
pub enum Error<S, P> {
    /// The output sink refused to start or stop.
    #[error("output sink: {0:?}")]
    Sink(S),
    /// The DAC mute or amplifier enable line could not be driven.
    #[error("control pin: {0:?}")]
    Pin(P),
}
