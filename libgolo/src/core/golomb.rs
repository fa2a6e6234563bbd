//! Golomb coding of signed integers.
//!
//! A codeword is a unary quotient (`q` zeros, then a one) followed by the
//! truncated-binary remainder. Negative inputs are handled either by the
//! interleaving (zig-zag) map or by a leading sign bit, chosen per coder
//! instance and fixed for its lifetime.

use std::io::{Read, Write};

use crate::core::bitstream::{BitReader, BitWriter};
use crate::error::{CodecError, CodecResult};

/// Decoder guard: a unary run longer than this is stream corruption.
const MAX_UNARY_RUN: u64 = 100_000;

/// How negative values are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMode {
    /// Zig-zag map: `0, -1, 1, -2, 2, ...` onto `0, 1, 2, 3, 4, ...`.
    Interleaving,
    /// One sign bit, then the Golomb code of the magnitude.
    SignMagnitude,
}

/// Map a signed integer onto the non-negative integers by interleaving.
#[inline]
pub fn interleave(n: i32) -> u64 {
    if n >= 0 {
        (n as u64) << 1
    } else {
        (((n as i64).unsigned_abs()) << 1) - 1
    }
}

/// Inverse of [`interleave`].
///
/// XOR form of the zig-zag inverse: even `u` halves to `u/2`, odd `u` to
/// `-(u+1)/2`. Wrapping arithmetic keeps `i32::MIN` (whose magnitude does
/// not fit a positive `i32`) from overflowing on the way back.
#[inline]
pub fn deinterleave(u: u64) -> i32 {
    ((u >> 1) as i32) ^ (0i32.wrapping_sub((u & 1) as i32))
}

/// Golomb coder with divisor `m`.
///
/// `b` and the truncated-binary cutoff are derived from `m` at construction;
/// adaptive codecs build a fresh coder whenever the block `m` changes.
pub struct Golomb {
    m: u32,
    b: u32,
    cutoff: u32,
    mode: SignMode,
}

impl Golomb {
    /// Create a coder. `m` must be at least 1.
    pub fn new(m: u32, mode: SignMode) -> CodecResult<Self> {
        if m == 0 {
            return Err(CodecError::InvalidParameter(
                "Golomb parameter m must be greater than 0".into(),
            ));
        }
        // b = ceil(log2(m)), forced to at least 1 so the m=1 coder emits an
        // empty remainder instead of a stray bit.
        let b = if m <= 1 {
            1
        } else {
            32 - (m - 1).leading_zeros()
        };
        let cutoff = ((1u64 << b) - m as u64) as u32;
        Ok(Golomb { m, b, cutoff, mode })
    }

    pub fn m(&self) -> u32 {
        self.m
    }

    pub fn mode(&self) -> SignMode {
        self.mode
    }

    /// Encode one signed integer into the bit stream.
    pub fn encode<W: Write>(&self, n: i32, bits: &mut BitWriter<W>) -> CodecResult<()> {
        let mapped = match self.mode {
            SignMode::Interleaving => interleave(n),
            SignMode::SignMagnitude => {
                bits.write_bit(u8::from(n < 0))?;
                n.unsigned_abs() as u64
            }
        };

        let q = mapped / self.m as u64;
        let r = (mapped % self.m as u64) as u32;

        for _ in 0..q {
            bits.write_bit(0)?;
        }
        bits.write_bit(1)?;

        if r < self.cutoff {
            if self.b > 1 {
                bits.write_bits(r as u64, self.b - 1)?;
            }
        } else {
            bits.write_bits((r + self.cutoff) as u64, self.b)?;
        }
        Ok(())
    }

    /// Number of bits [`encode`] emits for `n`.
    ///
    /// [`encode`]: Golomb::encode
    pub fn encoded_len(&self, n: i32) -> u64 {
        let mapped = match self.mode {
            SignMode::Interleaving => interleave(n),
            SignMode::SignMagnitude => n.unsigned_abs() as u64,
        };
        let q = mapped / self.m as u64;
        let r = (mapped % self.m as u64) as u32;
        let sign = u64::from(self.mode == SignMode::SignMagnitude);
        let remainder = if r < self.cutoff {
            self.b as u64 - 1
        } else {
            self.b as u64
        };
        sign + q + 1 + remainder
    }

    /// Decode one signed integer from the bit stream.
    pub fn decode<R: Read>(&self, bits: &mut BitReader<R>) -> CodecResult<i32> {
        let negative = match self.mode {
            SignMode::SignMagnitude => self.require_bit(bits)? == 1,
            SignMode::Interleaving => false,
        };

        let mut q: u64 = 0;
        while self.require_bit(bits)? == 0 {
            q += 1;
            if q > MAX_UNARY_RUN {
                return Err(CodecError::CorruptStream(format!(
                    "runaway unary run (> {MAX_UNARY_RUN} zeros)"
                )));
            }
        }

        let mut r: u32 = 0;
        if self.b > 1 {
            for _ in 0..self.b - 1 {
                r = (r << 1) | self.require_bit(bits)? as u32;
            }
        }
        if r >= self.cutoff {
            r = ((r << 1) | self.require_bit(bits)? as u32) - self.cutoff;
        }

        let mapped = q * self.m as u64 + r as u64;
        Ok(match self.mode {
            SignMode::Interleaving => deinterleave(mapped),
            SignMode::SignMagnitude => {
                // Wrapping so a magnitude of 2^31 decodes to i32::MIN
                // instead of overflowing the negation.
                let magnitude = mapped as i32;
                if negative {
                    magnitude.wrapping_neg()
                } else {
                    magnitude
                }
            }
        })
    }

    fn require_bit<R: Read>(&self, bits: &mut BitReader<R>) -> CodecResult<u8> {
        bits.read_bit()?.ok_or_else(|| {
            CodecError::CorruptStream("unexpected end of stream inside a codeword".into())
        })
    }
}

/// Choose the Golomb divisor for a block of residuals.
///
/// Uses the geometric-distribution optimum (Golomb 1966): with
/// `alpha = mean_abs / (mean_abs + 1)`, the best divisor is
/// `ceil(-1 / log2(alpha))`. The result is clamped to `[1, max_m]`.
pub fn optimal_m(residuals: &[i32], max_m: u32) -> u32 {
    let mean_abs = if residuals.is_empty() {
        1.0
    } else {
        residuals
            .iter()
            .map(|&r| r.unsigned_abs() as f64)
            .sum::<f64>()
            / residuals.len() as f64
    };

    if mean_abs <= 0.0 {
        return 1;
    }

    let alpha = mean_abs / (mean_abs + 1.0);
    let m = (-1.0 / alpha.log2()).ceil();
    if !m.is_finite() || m < 1.0 {
        1
    } else {
        (m as u32).clamp(1, max_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_m() {
        assert!(Golomb::new(0, SignMode::Interleaving).is_err());
    }

    #[test]
    fn interleave_is_bijective() {
        for n in [-5, -2, -1, 0, 1, 2, 7, i32::MIN, i32::MAX] {
            assert_eq!(deinterleave(interleave(n)), n);
        }
        // 0, -1, 1, -2, 2 -> 0, 1, 2, 3, 4
        assert_eq!(interleave(0), 0);
        assert_eq!(interleave(-1), 1);
        assert_eq!(interleave(1), 2);
        assert_eq!(interleave(-2), 3);
        assert_eq!(interleave(2), 4);
    }

    #[test]
    fn optimal_m_degenerate_blocks() {
        assert_eq!(optimal_m(&[], 65535), 1);
        assert_eq!(optimal_m(&[0, 0, 0, 0], 65535), 1);
        assert_eq!(optimal_m(&[10_000; 8], 255), 255);
    }
}
