//! Lookup tables for EQ band gains and volume curves.

/// Band gain per level magnitude, Q12. Linear from 0 to 7/6.
///
/// Index 7 exists because bass is looked up with a +1 offset, so the user's
/// +6 reads entry 7.
pub const BAND_GAIN_Q12: [i32; 8] = [
    0,    // level 0: no contribution
    683,  // 1/6
    1365, // 2/6
    2048, // 3/6
    2731, // 4/6
    3413, // 5/6
    4096, // 6/6
    4779, // 7/6
];

/// Host volume curve, Q8, indexed by `dB + 90` for dB in [-90, 0].
///
/// Power curve (exponent 5) so that steps at low volume stay small.
pub const HOST_VOLUME_Q8: [u16; 91] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // -90 .. -81
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // -80 .. -71
    0, 0, 0, 0, 0, 0, 1, 1, 1, 1, // -70 .. -61
    1, 1, 2, 2, 2, 2, 3, 3, 3, 4, // -60 .. -51
    5, 5, 6, 7, 8, 8, 9, 10, 11, 12, // -50 .. -41
    14, 15, 17, 19, 20, 22, 24, 26, 29, 32, // -40 .. -31
    34, 37, 40, 43, 47, 51, 55, 59, 64, 69, // -30 .. -21
    72, 78, 84, 90, 97, 103, 110, 118, 126, 135, // -20 .. -11
    142, 151, 161, 171, 181, 192, 204, 216, 229, 243, // -10 .. -1
    256, // 0 dB: unity
];

/// Pre-scale per power tier, Q8: −6 dB, −4 dB, −2 dB.
pub const POWER_TIER_Q8: [u16; 3] = [128, 161, 203];
