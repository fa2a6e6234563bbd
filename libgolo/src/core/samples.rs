//! Sample value conversions shared by the codecs.

/// Scale used when mapping 16-bit PCM to the unit range (1/32768).
pub const I16_TO_F64_SCALE: f64 = 1.0 / 32768.0;

/// Convert a 16-bit PCM sample to a float in [-1.0, 1.0).
#[inline]
pub fn i16_to_f64(sample: i16) -> f64 {
    sample as f64 * I16_TO_F64_SCALE
}

/// Convert a float sample to 16-bit PCM, clamping to the representable range.
#[inline]
pub fn f64_to_i16(sample: f64) -> i16 {
    (sample * 32768.0).clamp(-32768.0, 32767.0) as i16
}
