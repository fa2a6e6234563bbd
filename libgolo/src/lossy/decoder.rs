use std::io::Read;

use crate::core::bitstream::BitReader;
use crate::error::{CodecError, CodecResult};

use super::dct::Dct;
use super::adaptive_step;

/// A fully decoded lossy stream.
#[derive(Debug, Clone)]
pub struct DecodedLossyAudio {
    pub sample_rate: u32,
    /// Mono samples, clamped to `[-1.0, 1.0]`.
    pub samples: Vec<f64>,
}

/// Lossy transform decoder.
pub struct TransformDecoder;

impl TransformDecoder {
    pub fn new() -> Self {
        TransformDecoder
    }

    /// Decode a stream produced by [`TransformEncoder::encode`].
    ///
    /// [`TransformEncoder::encode`]: super::TransformEncoder::encode
    pub fn decode<R: Read>(&self, source: R) -> CodecResult<DecodedLossyAudio> {
        let mut bits = BitReader::new(source);

        let sample_rate = bits.read_bits(32)? as u32;
        let total_frames = bits.read_bits(32)? as u32;
        let block_size = bits.read_bits(16)? as usize;
        let base_q_ppm = bits.read_bits(32)? as u32;
        if bits.hit_eof() {
            return Err(CodecError::CorruptStream("truncated file header".into()));
        }
        if block_size == 0 {
            return Err(CodecError::CorruptStream("zero block size".into()));
        }
        if base_q_ppm == 0 {
            return Err(CodecError::CorruptStream("zero quantization step".into()));
        }
        let base_step = base_q_ppm as f64 / 1_000_000.0;
        tracing::debug!(sample_rate, total_frames, block_size, base_step, "lossy header");

        let dct = Dct::new(block_size);
        let mut quantized = vec![0i64; block_size];
        let mut coeffs = vec![0.0f64; block_size];
        let mut samples = Vec::with_capacity(total_frames as usize);

        while (samples.len() as u32) < total_frames {
            let energy_factor_q = bits.read_bits(16)?;
            if bits.hit_eof() {
                return Err(CodecError::CorruptStream(
                    "stream ends before the declared frame count".into(),
                ));
            }
            if energy_factor_q == 0 {
                return Err(CodecError::CorruptStream("zero energy factor".into()));
            }
            let energy_factor = energy_factor_q as f64 / 1000.0;

            for q in quantized.iter_mut() {
                let sign = bits.read_bit()?.ok_or_else(|| {
                    CodecError::CorruptStream("unexpected end of stream in a coefficient".into())
                })?;
                let mut magnitude_bits = bits.read_bits(5)? as u32;
                if magnitude_bits == 0 {
                    magnitude_bits = 1;
                }
                let magnitude = bits.read_bits(magnitude_bits)? as i64;
                if bits.hit_eof() {
                    return Err(CodecError::CorruptStream(
                        "unexpected end of stream in a coefficient".into(),
                    ));
                }
                *q = if sign == 1 { -magnitude } else { magnitude };
            }

            for (k, (&q, c)) in quantized.iter().zip(coeffs.iter_mut()).enumerate() {
                *c = q as f64 * adaptive_step(k, block_size, base_step, energy_factor);
            }

            let block = dct.inverse(&coeffs);
            let remaining = (total_frames as usize) - samples.len();
            samples.extend(
                block
                    .iter()
                    .take(remaining)
                    .map(|&s| s.clamp(-1.0, 1.0)),
            );
        }

        Ok(DecodedLossyAudio {
            sample_rate,
            samples,
        })
    }
}

impl Default for TransformDecoder {
    fn default() -> Self {
        Self::new()
    }
}
