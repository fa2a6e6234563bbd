use std::io::Write;

use crate::core::bitstream::BitWriter;
use crate::error::{CodecError, CodecResult};

use super::dct::Dct;
use super::{adaptive_step, BASE_QUANTIZATION, BLOCK_SIZE, MAX_MAGNITUDE_BITS};

/// Lossy transform encoder for monaural audio.
pub struct TransformEncoder {
    dct: Dct,
    base_step: f64,
}

impl TransformEncoder {
    pub fn new() -> Self {
        TransformEncoder {
            dct: Dct::new(BLOCK_SIZE),
            base_step: BASE_QUANTIZATION,
        }
    }

    /// Override the base quantization step (larger = coarser).
    pub fn with_base_step(mut self, base_step: f64) -> CodecResult<Self> {
        if !(base_step > 0.0) || (base_step * 1_000_000.0) as u64 > u32::MAX as u64 {
            return Err(CodecError::InvalidParameter(format!(
                "base quantization step {base_step} out of range"
            )));
        }
        self.base_step = base_step;
        Ok(self)
    }

    /// Encode mono samples in `[-1.0, 1.0]` into `sink`, returning the sink.
    ///
    /// The final short block is zero-padded to the transform length.
    pub fn encode<W: Write>(
        &self,
        samples: &[f64],
        sample_rate: u32,
        sink: W,
    ) -> CodecResult<W> {
        // The frame-count field is 32-bit on the wire.
        let total_frames = u32::try_from(samples.len()).map_err(|_| {
            CodecError::InvalidParameter(format!(
                "stream of {} frames exceeds the 32-bit frame count field",
                samples.len()
            ))
        })?;

        let mut bits = BitWriter::new(sink);
        bits.write_bits(sample_rate as u64, 32)?;
        bits.write_bits(total_frames as u64, 32)?;
        bits.write_bits(BLOCK_SIZE as u64, 16)?;
        bits.write_bits((self.base_step * 1_000_000.0) as u64, 32)?;

        let mut block = vec![0.0f64; BLOCK_SIZE];
        for (block_index, chunk) in samples.chunks(BLOCK_SIZE).enumerate() {
            block[..chunk.len()].copy_from_slice(chunk);
            block[chunk.len()..].fill(0.0);

            // RMS over the padded block drives the adaptive step; the factor
            // travels quantized to u16, and the quantized value is what both
            // sides use, so the steps match bit for bit.
            let energy =
                (block.iter().map(|&s| s * s).sum::<f64>() / BLOCK_SIZE as f64).sqrt();
            let energy_factor_q = ((energy * 10.0).clamp(0.5, 2.0) * 1000.0) as u16;
            let energy_factor = energy_factor_q as f64 / 1000.0;
            tracing::debug!(block = block_index, energy_factor, "encoding transform block");

            bits.write_bits(energy_factor_q as u64, 16)?;

            let coeffs = self.dct.forward(&block);
            for (k, &coeff) in coeffs.iter().enumerate() {
                let step = adaptive_step(k, BLOCK_SIZE, self.base_step, energy_factor);
                let quantized = (coeff / step).round() as i64;

                bits.write_bit(u8::from(quantized < 0))?;

                let magnitude = quantized.unsigned_abs();
                let magnitude_bits =
                    (64 - magnitude.leading_zeros()).clamp(1, MAX_MAGNITUDE_BITS);
                bits.write_bits(magnitude_bits as u64, 5)?;
                bits.write_bits(magnitude & ((1u64 << magnitude_bits) - 1), magnitude_bits)?;
            }
        }

        bits.finish()
    }
}

impl Default for TransformEncoder {
    fn default() -> Self {
        Self::new()
    }
}
