//! Biquad coefficient design (RBJ audio EQ cookbook).
//!
//! Used to author profiles on device and to build test fixtures; profiles
//! from the PC tool arrive with coefficients already computed.

use core::f32::consts::TAU;

use libm::{cosf, powf, sinf, sqrtf};

use super::{BiquadCoefficients, Filter, FilterKind};

struct Prewarp {
    cos: f32,
    alpha: f32,
}

fn prewarp(sample_rate: f32, freq_hz: f32, q: f32) -> Prewarp {
    let w0 = TAU * freq_hz / sample_rate;
    Prewarp {
        cos: cosf(w0),
        alpha: sinf(w0) / (2.0 * q),
    }
}

fn normalize(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> BiquadCoefficients {
    let norm = 1.0 / a0;
    BiquadCoefficients::new(b0 * norm, b1 * norm, b2 * norm, a1 * norm, a2 * norm)
}

/// Peaking filter: `gain_db` at `freq_hz`, unity far from it.
pub fn bell(sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> BiquadCoefficients {
    let a = powf(10.0, gain_db / 40.0);
    let Prewarp { cos, alpha } = prewarp(sample_rate, freq_hz, q);
    normalize(
        1.0 + alpha * a,
        -2.0 * cos,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos,
        1.0 - alpha / a,
    )
}

/// Shelf below `freq_hz` raised or cut by `gain_db`.
pub fn low_shelf(sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> BiquadCoefficients {
    let a = powf(10.0, gain_db / 40.0);
    let Prewarp { cos, alpha } = prewarp(sample_rate, freq_hz, q);
    let k = 2.0 * sqrtf(a) * alpha;
    normalize(
        a * ((a + 1.0) - (a - 1.0) * cos + k),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cos),
        a * ((a + 1.0) - (a - 1.0) * cos - k),
        (a + 1.0) + (a - 1.0) * cos + k,
        -2.0 * ((a - 1.0) + (a + 1.0) * cos),
        (a + 1.0) + (a - 1.0) * cos - k,
    )
}

/// Shelf above `freq_hz` raised or cut by `gain_db`.
pub fn high_shelf(sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> BiquadCoefficients {
    let a = powf(10.0, gain_db / 40.0);
    let Prewarp { cos, alpha } = prewarp(sample_rate, freq_hz, q);
    let k = 2.0 * sqrtf(a) * alpha;
    normalize(
        a * ((a + 1.0) + (a - 1.0) * cos + k),
        -2.0 * a * ((a - 1.0) + (a + 1.0) * cos),
        a * ((a + 1.0) + (a - 1.0) * cos - k),
        (a + 1.0) - (a - 1.0) * cos + k,
        2.0 * ((a - 1.0) - (a + 1.0) * cos),
        (a + 1.0) - (a - 1.0) * cos - k,
    )
}

/// Second-order lowpass with corner `freq_hz`.
pub fn low_pass(sample_rate: f32, freq_hz: f32, q: f32) -> BiquadCoefficients {
    let Prewarp { cos, alpha } = prewarp(sample_rate, freq_hz, q);
    normalize(
        (1.0 - cos) * 0.5,
        1.0 - cos,
        (1.0 - cos) * 0.5,
        1.0 + alpha,
        -2.0 * cos,
        1.0 - alpha,
    )
}

/// Second-order highpass with corner `freq_hz`.
pub fn high_pass(sample_rate: f32, freq_hz: f32, q: f32) -> BiquadCoefficients {
    let Prewarp { cos, alpha } = prewarp(sample_rate, freq_hz, q);
    normalize(
        (1.0 + cos) * 0.5,
        -(1.0 + cos),
        (1.0 + cos) * 0.5,
        1.0 + alpha,
        -2.0 * cos,
        1.0 - alpha,
    )
}

impl Filter {
    /// Design an enabled stage of the given shape. Pass filters ignore
    /// `gain_db`; [`FilterKind::Off`] yields the identity stage.
    pub fn design(kind: FilterKind, sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> Self {
        let coeffs = match kind {
            FilterKind::Off => BiquadCoefficients::IDENTITY,
            FilterKind::Bell => bell(sample_rate, freq_hz, gain_db, q),
            FilterKind::LowShelf => low_shelf(sample_rate, freq_hz, gain_db, q),
            FilterKind::HighShelf => high_shelf(sample_rate, freq_hz, gain_db, q),
            FilterKind::LowPass => low_pass(sample_rate, freq_hz, q),
            FilterKind::HighPass => high_pass(sample_rate, freq_hz, q),
        };
        Filter::new(kind, coeffs, freq_hz, gain_db, q)
    }
}
