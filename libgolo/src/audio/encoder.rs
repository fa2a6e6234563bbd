use std::io::Write;

use crate::core::bitstream::BitWriter;
use crate::core::golomb::{optimal_m, Golomb, SignMode};
use crate::error::{CodecError, CodecResult};

use super::predictor::{Predictor, MAX_ORDER};
use super::{to_mid_side, MAX_AUDIO_M};

/// Lossless audio encoder.
///
/// Configuration is validated at construction; [`encode`] can then be called
/// for any number of independent streams.
///
/// [`encode`]: AudioEncoder::encode
pub struct AudioEncoder {
    block_frames: u32,
    m: u32,
    order: u8,
}

impl AudioEncoder {
    /// Create an encoder.
    ///
    /// `block_frames` is the number of frames per block and must be nonzero.
    /// `m` is the Golomb divisor: 0 selects per-block adaptation, any other
    /// value is used for every block. `order` is the predictor order (0-3).
    pub fn new(block_frames: u32, m: u32, order: u8) -> CodecResult<Self> {
        if block_frames == 0 {
            return Err(CodecError::InvalidParameter(
                "block size must be at least one frame".into(),
            ));
        }
        if m > MAX_AUDIO_M {
            return Err(CodecError::InvalidParameter(format!(
                "Golomb parameter {m} does not fit the 16-bit block field"
            )));
        }
        if order > MAX_ORDER {
            return Err(CodecError::InvalidParameter(format!(
                "predictor order {order} out of range 0..=3"
            )));
        }
        Ok(AudioEncoder {
            block_frames,
            m,
            order,
        })
    }

    /// Encode interleaved 16-bit samples into `sink`, returning the sink.
    ///
    /// Stereo input is re-expressed as mid/side before prediction; other
    /// channel counts are predicted independently per channel.
    pub fn encode<W: Write>(
        &self,
        samples: &[i16],
        sample_rate: u32,
        channels: u16,
        sink: W,
    ) -> CodecResult<W> {
        if channels == 0 {
            return Err(CodecError::InvalidParameter(
                "channel count must be at least 1".into(),
            ));
        }
        if samples.len() % channels as usize != 0 {
            return Err(CodecError::InvalidParameter(format!(
                "sample count {} is not a multiple of {channels} channels",
                samples.len()
            )));
        }
        let frames = (samples.len() / channels as usize) as u64;
        let mid_side = channels == 2;

        let mut bits = BitWriter::new(sink);
        bits.write_bits(sample_rate as u64, 32)?;
        bits.write_bits(channels as u64, 16)?;
        bits.write_bits(frames, 64)?;
        bits.write_bits(self.block_frames as u64, 32)?;
        bits.write_bits(self.order as u64, 8)?;

        let mut predictors: Vec<Predictor> = (0..channels)
            .map(|_| Predictor::new(self.order))
            .collect::<CodecResult<_>>()?;

        let samples_per_block = self.block_frames as usize * channels as usize;
        let mut residuals = Vec::with_capacity(samples_per_block);

        for (block_index, block) in samples.chunks(samples_per_block).enumerate() {
            residuals.clear();

            let transformed: Vec<i16> = if mid_side {
                block
                    .chunks_exact(2)
                    .flat_map(|frame| {
                        let (mid, side) = to_mid_side(frame[0], frame[1]);
                        [mid, side]
                    })
                    .collect()
            } else {
                block.to_vec()
            };

            for (i, &sample) in transformed.iter().enumerate() {
                let predictor = &mut predictors[i % channels as usize];
                residuals.push(sample as i32 - predictor.predict());
                predictor.push(sample);
            }

            let block_m = if self.m == 0 {
                optimal_m(&residuals, MAX_AUDIO_M)
            } else {
                self.m
            };
            tracing::debug!(
                block = block_index,
                m = block_m,
                residuals = residuals.len(),
                "encoding audio block"
            );

            bits.write_bits(block_m as u64, 16)?;
            bits.write_bits(residuals.len() as u64, 32)?;

            let coder = Golomb::new(block_m, SignMode::Interleaving)?;
            for &resid in &residuals {
                coder.encode(resid, &mut bits)?;
            }
        }

        bits.finish()
    }
}
