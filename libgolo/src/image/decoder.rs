use std::io::Read;

use crate::core::bitstream::BitReader;
use crate::core::golomb::{Golomb, SignMode};
use crate::error::{CodecError, CodecResult};

use super::predictor::ImagePredictor;
use super::{GrayImage, IMAGE_MAGIC};

/// Lossless image decoder.
pub struct ImageDecoder;

impl ImageDecoder {
    pub fn new() -> Self {
        ImageDecoder
    }

    /// Decode a stream produced by [`ImageEncoder::encode`].
    ///
    /// [`ImageEncoder::encode`]: super::ImageEncoder::encode
    pub fn decode<R: Read>(&self, source: R) -> CodecResult<GrayImage> {
        let mut bits = BitReader::new(source);

        let magic = bits.read_bits(32)? as u32;
        if magic != IMAGE_MAGIC {
            return Err(CodecError::InvalidFormat(format!(
                "bad magic {magic:#010x}, expected {IMAGE_MAGIC:#010x}"
            )));
        }
        let width = bits.read_bits(32)? as u32;
        let height = bits.read_bits(32)? as u32;
        let predictor_index = bits.read_bits(8)? as u8;
        let m_flag = bits.read_bits(8)? as u32;
        let block_size = bits.read_bits(32)? as u32;
        if bits.hit_eof() {
            return Err(CodecError::CorruptStream("truncated file header".into()));
        }
        let predictor = ImagePredictor::from_index(predictor_index)
            .map_err(|_| CodecError::InvalidFormat(format!(
                "predictor index {predictor_index} out of range 0..=8"
            )))?;
        tracing::debug!(width, height, predictor = predictor_index, m_flag, block_size, "image header");

        let total_pixels = width as u64 * height as u64;
        let mut pixels = vec![0u8; total_pixels as usize];
        if total_pixels == 0 {
            return GrayImage::new(width, height, pixels);
        }
        if block_size == 0 {
            return Err(CodecError::CorruptStream("zero block size".into()));
        }

        let adaptive = m_flag == 0;
        let mut block_start: u64 = 0;
        while block_start < total_pixels {
            let count = (block_size as u64).min(total_pixels - block_start);

            let block_m = if adaptive {
                let m = bits.read_bits(8)? as u32;
                if bits.hit_eof() {
                    return Err(CodecError::CorruptStream("truncated block header".into()));
                }
                if m == 0 {
                    return Err(CodecError::CorruptStream(format!(
                        "block at pixel {block_start} declares m = 0"
                    )));
                }
                m
            } else {
                m_flag
            };
            tracing::debug!(pixel = block_start, m = block_m, "decoding image block");

            let coder = Golomb::new(block_m, SignMode::Interleaving)?;
            for i in 0..count {
                let index = block_start + i;
                let x = (index % width as u64) as u32;
                let y = (index / width as u64) as u32;

                let resid = coder.decode(&mut bits)?;
                let (a, b, c) = GrayImage::neighbourhood(&pixels, width, x, y);
                let pred = predictor.predict(a, b, c, x, y);
                pixels[index as usize] = (pred + resid).clamp(0, 255) as u8;
            }

            block_start += count;
        }

        GrayImage::new(width, height, pixels)
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}
