use std::io::Read;

use crate::core::bitstream::BitReader;
use crate::core::golomb::{Golomb, SignMode};
use crate::error::{CodecError, CodecResult};

use super::predictor::{Predictor, MAX_ORDER};
use super::from_mid_side;

/// A fully decoded audio stream.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    /// Interleaved frames, `channels` samples each.
    pub samples: Vec<i16>,
}

/// Lossless audio decoder.
pub struct AudioDecoder;

impl AudioDecoder {
    pub fn new() -> Self {
        AudioDecoder
    }

    /// Decode a stream produced by [`AudioEncoder::encode`].
    ///
    /// [`AudioEncoder::encode`]: super::AudioEncoder::encode
    pub fn decode<R: Read>(&self, source: R) -> CodecResult<DecodedAudio> {
        let mut bits = BitReader::new(source);

        let sample_rate = bits.read_bits(32)? as u32;
        let channels = bits.read_bits(16)? as u16;
        let frames = bits.read_bits(64)?;
        let block_frames = bits.read_bits(32)? as u32;
        let order = bits.read_bits(8)? as u8;
        if bits.hit_eof() {
            return Err(CodecError::CorruptStream("truncated file header".into()));
        }
        if channels == 0 {
            return Err(CodecError::InvalidFormat("zero channel count".into()));
        }
        if order > MAX_ORDER {
            return Err(CodecError::InvalidFormat(format!(
                "predictor order {order} out of range 0..=3"
            )));
        }
        tracing::debug!(sample_rate, channels, frames, block_frames, order, "audio header");

        let total_samples = frames
            .checked_mul(channels as u64)
            .ok_or_else(|| CodecError::CorruptStream("frame count overflow".into()))?;
        let mid_side = channels == 2;

        let mut predictors: Vec<Predictor> = (0..channels)
            .map(|_| Predictor::new(order))
            .collect::<CodecResult<_>>()?;

        let mut samples: Vec<i16> = Vec::new();
        let mut block = Vec::new();
        let mut produced: u64 = 0;
        let mut block_index = 0usize;

        while produced < total_samples {
            let block_m = bits.read_bits(16)? as u32;
            let count = bits.read_bits(32)?;
            if bits.hit_eof() {
                return Err(CodecError::CorruptStream("truncated block header".into()));
            }
            if block_m == 0 {
                return Err(CodecError::CorruptStream(format!(
                    "block {block_index} declares m = 0"
                )));
            }
            if count == 0
                || count % channels as u64 != 0
                || produced + count > total_samples
            {
                return Err(CodecError::CorruptStream(format!(
                    "block {block_index} declares {count} samples"
                )));
            }
            tracing::debug!(block = block_index, m = block_m, samples = count, "decoding audio block");

            let coder = Golomb::new(block_m, SignMode::Interleaving)?;

            block.clear();
            for i in 0..count {
                let resid = coder.decode(&mut bits)?;
                let predictor = &mut predictors[(i % channels as u64) as usize];
                let sample = (predictor.predict() + resid) as i16;
                block.push(sample);
                predictor.push(sample);
            }

            if mid_side {
                for frame in block.chunks_exact(2) {
                    let (left, right) = from_mid_side(frame[0], frame[1]);
                    samples.push(left);
                    samples.push(right);
                }
            } else {
                samples.extend_from_slice(&block);
            }

            produced += count;
            block_index += 1;
        }

        Ok(DecodedAudio {
            sample_rate,
            channels,
            samples,
        })
    }
}

impl Default for AudioDecoder {
    fn default() -> Self {
        Self::new()
    }
}
