//! Q12 and Q8 fixed-point helpers with an ARM `SSAT` fast path.
//!
//! Samples are 24-bit values in an `i32`. Coefficients are Q12 (4096 = 1.0),
//! gains are Q8 (256 = 1.0). A direct 24 × 12-bit product can overflow the
//! 32-bit accumulator, so every coefficient multiply goes through
//! [`mul_q12`].

#[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
use crate::constants::{SAMPLE_MAX, SAMPLE_MIN};

/// Fractional bits of a Q12 coefficient.
pub const Q12_SHIFT: u32 = 12;

/// 1.0 in Q12.
pub const Q12_ONE: i32 = 1 << Q12_SHIFT;

/// Fixed −5 dB pre-attenuation applied by both EQ engines (0.5623 ≈ 2303/4096).
pub const PREATT_Q12: i32 = 2303;

/// Split multiply: `(a * coeff) >> 12` without a 64-bit intermediate.
///
/// `a` is decomposed into `a >> 8` (signed) and `a & 0xFF` (unsigned); each
/// part is multiplied by `coeff` separately and the results recombined. The
/// result is the exact Q12 product or one less. Valid while
/// `(a >> 8) * coeff` fits in an `i32`, which holds for every 24-bit sample
/// against any coefficient below 2^15.
#[inline(always)]
pub fn mul_q12(a: i32, coeff: i32) -> i32 {
    let hi = a >> 8;
    let lo = a & 0xFF;
    ((hi * coeff) >> 4) + ((lo * coeff) >> Q12_SHIFT)
}

/// Saturate to the signed 24-bit range.
///
/// Maps to ARM `SSAT #24`.
#[inline(always)]
pub fn saturate24(val: i32) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #24, {val}",
                out = out(reg) out,
                val = in(reg) val,
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        if val > SAMPLE_MAX {
            SAMPLE_MAX
        } else if val < SAMPLE_MIN {
            SAMPLE_MIN
        } else {
            val
        }
    }
}

/// Scale a 24-bit sample by a Q8 gain (`gain <= 256`).
///
/// Fits in 32 bits because the sample is already inside the 24-bit range.
#[inline(always)]
pub fn scale_q8(sample: i32, gain: u16) -> i32 {
    (sample * gain as i32) >> 8
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::constants::{SAMPLE_MAX, SAMPLE_MIN};

    fn exact_q12(a: i32, coeff: i32) -> i32 {
        ((a as i64 * coeff as i64) >> Q12_SHIFT) as i32
    }

    fn assert_within_one_ulp(a: i32, coeff: i32) {
        let exact = exact_q12(a, coeff);
        let split = mul_q12(a, coeff);
        let diff = exact - split;
        assert!(
            diff == 0 || diff == 1,
            "a={a} coeff={coeff}: split={split} exact={exact}"
        );
    }

    #[test]
    fn split_multiply_matches_exact_across_24_bit_domain() {
        // Every input against the pre-attenuation constant
        let mut a = SAMPLE_MIN;
        while a <= SAMPLE_MAX {
            assert_within_one_ulp(a, PREATT_Q12);
            a += 1;
        }
    }

    #[test]
    fn split_multiply_matches_exact_for_filter_coefficients() {
        // Coefficients used by the two-band engine, including the 3x bass gain
        let coeffs = [0, 1, 27, 95, 817, 3279, 4001, 4069, 4096, 4779, 5973, 14337, -4096];
        for &coeff in coeffs.iter() {
            let mut a = SAMPLE_MIN;
            while a <= SAMPLE_MAX {
                assert_within_one_ulp(a, coeff);
                a += 251;
            }
            assert_within_one_ulp(SAMPLE_MAX, coeff);
            assert_within_one_ulp(SAMPLE_MIN, coeff);
            assert_within_one_ulp(-1, coeff);
        }
    }

    #[test]
    fn split_multiply_unity_is_identity() {
        for a in [0, 1, -1, 255, -256, 123_456, SAMPLE_MAX, SAMPLE_MIN] {
            assert_eq!(mul_q12(a, Q12_ONE), a);
        }
    }

    #[test]
    fn saturate24_clamps() {
        assert_eq!(saturate24(0), 0);
        assert_eq!(saturate24(SAMPLE_MAX + 1), SAMPLE_MAX);
        assert_eq!(saturate24(SAMPLE_MIN - 1), SAMPLE_MIN);
        assert_eq!(saturate24(i32::MAX), SAMPLE_MAX);
        assert_eq!(saturate24(i32::MIN), SAMPLE_MIN);
        assert_eq!(saturate24(-42), -42);
    }

    #[test]
    fn scale_q8_extremes() {
        assert_eq!(scale_q8(SAMPLE_MAX, 256), SAMPLE_MAX);
        assert_eq!(scale_q8(SAMPLE_MIN, 256), SAMPLE_MIN);
        assert_eq!(scale_q8(1000, 128), 500);
        assert_eq!(scale_q8(SAMPLE_MAX, 0), 0);
    }
}
