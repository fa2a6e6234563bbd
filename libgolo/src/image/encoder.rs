use std::io::Write;

use crate::core::bitstream::BitWriter;
use crate::core::golomb::{optimal_m, Golomb, SignMode};
use crate::error::{CodecError, CodecResult};

use super::predictor::ImagePredictor;
use super::{GrayImage, IMAGE_MAGIC, MAX_IMAGE_M};

/// Lossless image encoder.
pub struct ImageEncoder {
    predictor: Option<ImagePredictor>,
    m: u32,
    block_size: u32,
}

impl ImageEncoder {
    /// Create an encoder.
    ///
    /// `predictor` is the spatial mode, or `None` to trial all nine modes
    /// and keep the smallest output. `m` is the Golomb divisor: 0 selects
    /// per-block adaptation, otherwise the fixed value is stored in the
    /// header (it must fit the 8-bit field). `block_size` is in pixels;
    /// 0 means one image row per block.
    pub fn new(predictor: Option<ImagePredictor>, m: u32, block_size: u32) -> CodecResult<Self> {
        if m > MAX_IMAGE_M {
            return Err(CodecError::InvalidParameter(format!(
                "Golomb parameter {m} does not fit the 8-bit image field"
            )));
        }
        Ok(ImageEncoder {
            predictor,
            m,
            block_size,
        })
    }

    /// Encode `image` into `sink`, returning the sink.
    pub fn encode<W: Write>(&self, image: &GrayImage, mut sink: W) -> CodecResult<W> {
        match self.predictor {
            Some(predictor) => self.encode_with(predictor, image, sink),
            None => {
                // Trial-encode with every predictor and keep the smallest
                // output; the chosen index travels in the header, so the
                // decoder never repeats the search.
                let mut best: Option<(ImagePredictor, Vec<u8>)> = None;
                for predictor in ImagePredictor::ALL {
                    let encoded = self.encode_with(predictor, image, Vec::new())?;
                    tracing::debug!(
                        predictor = predictor.index(),
                        bytes = encoded.len(),
                        "auto-select trial"
                    );
                    match &best {
                        Some((_, bytes)) if bytes.len() <= encoded.len() => {}
                        _ => best = Some((predictor, encoded)),
                    }
                }
                let (predictor, bytes) =
                    best.expect("predictor table is never empty");
                tracing::debug!(predictor = predictor.index(), "auto-select winner");
                sink.write_all(&bytes)?;
                Ok(sink)
            }
        }
    }

    fn encode_with<W: Write>(
        &self,
        predictor: ImagePredictor,
        image: &GrayImage,
        sink: W,
    ) -> CodecResult<W> {
        let width = image.width;
        let total_pixels = width as u64 * image.height as u64;
        let block_size = if self.block_size == 0 {
            width
        } else {
            self.block_size
        };

        let mut bits = BitWriter::new(sink);
        bits.write_bits(IMAGE_MAGIC as u64, 32)?;
        bits.write_bits(width as u64, 32)?;
        bits.write_bits(image.height as u64, 32)?;
        bits.write_bits(predictor.index() as u64, 8)?;
        bits.write_bits(self.m as u64, 8)?;
        bits.write_bits(block_size as u64, 32)?;

        if total_pixels == 0 {
            return bits.finish();
        }

        let mut residuals = Vec::with_capacity(block_size as usize);
        let mut block_start: u64 = 0;
        while block_start < total_pixels {
            let count = (block_size as u64).min(total_pixels - block_start) as u32;

            residuals.clear();
            for i in 0..count as u64 {
                let index = block_start + i;
                let x = (index % width as u64) as u32;
                let y = (index / width as u64) as u32;
                let (a, b, c) = GrayImage::neighbourhood(&image.pixels, width, x, y);
                let pred = predictor.predict(a, b, c, x, y);
                residuals.push(image.pixels[index as usize] as i32 - pred);
            }

            let block_m = if self.m == 0 {
                let m = optimal_m(&residuals, MAX_IMAGE_M);
                bits.write_bits(m as u64, 8)?;
                m
            } else {
                self.m
            };
            tracing::debug!(
                pixel = block_start,
                m = block_m,
                residuals = residuals.len(),
                "encoding image block"
            );

            let coder = Golomb::new(block_m, SignMode::Interleaving)?;
            for &resid in &residuals {
                coder.encode(resid, &mut bits)?;
            }

            block_start += count as u64;
        }

        bits.finish()
    }
}
