//! WAV reading (via symphonia) and writing (hand-rolled RIFF).
//!
//! Reading keeps 16-bit PCM exact: S16 packets pass through untouched, so a
//! lossless encode/decode cycle reproduces the input samples bit for bit.
//! Other sample formats are converted to 16-bit on the way in.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Read an audio file as interleaved 16-bit samples.
pub fn read_audio_i16(path: &Path) -> Result<(Vec<i16>, u32, u16)> {
    let file = std::fs::File::open(path).context("Failed to open audio file")?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unsupported audio format")?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Unknown sample rate")?;
    let channels = track
        .codec_params
        .channels
        .context("Unknown channel count")?
        .count() as u16;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e).context("Error decoding packet"),
        };
        append_samples(&decoded, &mut samples, channels as usize);
    }

    Ok((samples, sample_rate, channels))
}

fn append_samples(buffer: &AudioBufferRef, samples: &mut Vec<i16>, channels: usize) {
    match buffer {
        AudioBufferRef::S16(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    samples.push(buf.chan(ch)[frame]);
                }
            }
        }
        AudioBufferRef::S32(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    samples.push((buf.chan(ch)[frame] >> 16) as i16);
                }
            }
        }
        AudioBufferRef::F32(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    let s = buf.chan(ch)[frame];
                    samples.push((s * 32768.0).clamp(-32768.0, 32767.0) as i16);
                }
            }
        }
        AudioBufferRef::U8(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    samples.push(((buf.chan(ch)[frame] as i16) - 128) << 8);
                }
            }
        }
        _ => {}
    }
}

/// Write interleaved 16-bit samples as a PCM16 RIFF/WAV file.
pub fn write_wav_i16(
    path: &Path,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<()> {
    let mut buffer = Vec::with_capacity(44 + samples.len() * 2);

    let data_size = samples.len() * 2;
    let file_size = 36 + data_size;

    buffer.write_all(b"RIFF")?;
    buffer.write_all(&(file_size as u32).to_le_bytes())?;
    buffer.write_all(b"WAVE")?;

    buffer.write_all(b"fmt ")?;
    buffer.write_all(&16u32.to_le_bytes())?;
    buffer.write_all(&1u16.to_le_bytes())?; // PCM
    buffer.write_all(&channels.to_le_bytes())?;
    buffer.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * channels as u32 * 2;
    buffer.write_all(&byte_rate.to_le_bytes())?;
    let block_align = channels * 2;
    buffer.write_all(&block_align.to_le_bytes())?;
    buffer.write_all(&16u16.to_le_bytes())?;

    buffer.write_all(b"data")?;
    buffer.write_all(&(data_size as u32).to_le_bytes())?;
    for &sample in samples {
        buffer.write_all(&sample.to_le_bytes())?;
    }

    std::fs::write(path, buffer).context("Failed to write WAV file")
}
