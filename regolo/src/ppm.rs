//! PPM P5 (binary grayscale) reading and writing.
//!
//! Header: `P5`, ASCII width, height and maxval separated by whitespace,
//! then a single whitespace byte, then `width * height` raw bytes.
//! Only `maxval = 255` is accepted.

use anyhow::{bail, Context, Result};
use libgolo::GrayImage;
use std::fs;
use std::path::Path;

pub fn read_ppm(path: &Path) -> Result<GrayImage> {
    let data = fs::read(path).context("Failed to read input image")?;
    let mut pos = 0;

    let magic = next_token(&data, &mut pos);
    if magic != b"P5" {
        bail!("Only PPM P5 (binary grayscale) is supported");
    }

    let width: u32 = parse_field(&data, &mut pos, "width")?;
    let height: u32 = parse_field(&data, &mut pos, "height")?;
    let maxval: u32 = parse_field(&data, &mut pos, "maxval")?;
    if maxval != 255 {
        bail!("Only 8-bit grayscale is supported (maxval 255, got {maxval})");
    }

    // Single whitespace byte separates the header from the raster.
    pos += 1;

    let expected = width as usize * height as usize;
    let pixels = data
        .get(pos..pos + expected)
        .with_context(|| format!("Image data truncated: expected {expected} pixel bytes"))?
        .to_vec();

    GrayImage::new(width, height, pixels).map_err(Into::into)
}

pub fn write_ppm(path: &Path, image: &GrayImage) -> Result<()> {
    let mut data = format!("P5\n{} {}\n255\n", image.width, image.height).into_bytes();
    data.extend_from_slice(&image.pixels);
    fs::write(path, data).context("Failed to write output image")
}

fn next_token<'a>(data: &'a [u8], pos: &mut usize) -> &'a [u8] {
    while *pos < data.len() && data[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    let start = *pos;
    while *pos < data.len() && !data[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    &data[start..*pos]
}

fn parse_field(data: &[u8], pos: &mut usize, name: &str) -> Result<u32> {
    let token = next_token(data, pos);
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .with_context(|| format!("Invalid PPM header field: {name}"))
}
