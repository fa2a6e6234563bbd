//! End-to-end tests for the lossless audio codec.

use libgolo::audio::{from_mid_side, to_mid_side};
use libgolo::{AudioDecoder, AudioEncoder, CodecError};

/// Deterministic pseudo-random generator (xorshift32) for test signals.
struct Rng(u32);

impl Rng {
    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    fn sample(&mut self, amplitude: i32) -> i16 {
        ((self.next() % (2 * amplitude as u32 + 1)) as i32 - amplitude) as i16
    }
}

fn tone(frames: usize, channels: usize, amplitude: f64) -> Vec<i16> {
    let mut samples = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        for ch in 0..channels {
            let phase = i as f64 * 0.02 + ch as f64 * 0.5;
            samples.push((phase.sin() * amplitude) as i16);
        }
    }
    samples
}

fn roundtrip(samples: &[i16], channels: u16, block: u32, m: u32, order: u8) -> Vec<i16> {
    let encoder = AudioEncoder::new(block, m, order).unwrap();
    let encoded = encoder.encode(samples, 44100, channels, Vec::new()).unwrap();
    let decoded = AudioDecoder::new().decode(&encoded[..]).unwrap();
    assert_eq!(decoded.sample_rate, 44100);
    assert_eq!(decoded.channels, channels);
    decoded.samples
}

#[test]
fn mono_roundtrip_every_order() {
    let samples = tone(3000, 1, 12000.0);
    for order in 0..=3 {
        assert_eq!(roundtrip(&samples, 1, 512, 0, order), samples, "order {order}");
    }
}

#[test]
fn stereo_roundtrip_every_order() {
    let samples = tone(3000, 2, 12000.0);
    for order in 0..=3 {
        assert_eq!(roundtrip(&samples, 2, 512, 0, order), samples, "order {order}");
    }
}

#[test]
fn roundtrip_fixed_m_values() {
    // Quiet signal keeps the unary quotients affordable even at m = 1.
    let samples = tone(2000, 2, 900.0);
    for m in [1, 4, 32, 256] {
        assert_eq!(roundtrip(&samples, 2, 512, m, 2), samples, "m {m}");
    }
}

#[test]
fn roundtrip_block_sizes() {
    let samples = tone(9000, 2, 8000.0);
    for block in [512, 4096, 65536] {
        assert_eq!(roundtrip(&samples, 2, block, 0, 2), samples, "block {block}");
    }
}

#[test]
fn roundtrip_partial_final_block() {
    // 1023 frames with block 512: the last block holds 511 frames.
    let samples = tone(1023, 1, 5000.0);
    assert_eq!(roundtrip(&samples, 1, 512, 0, 1), samples);
}

#[test]
fn roundtrip_noise_full_scale() {
    let mut rng = Rng(0x2545_F491);
    let samples: Vec<i16> = (0..4096).map(|_| rng.sample(32000)).collect();
    assert_eq!(roundtrip(&samples, 1, 1024, 0, 2), samples);
}

#[test]
fn roundtrip_stereo_extremes() {
    // Full-scale antiphase frames push mid/side through the wrapping path.
    let mut samples = Vec::new();
    for _ in 0..600 {
        samples.extend_from_slice(&[32767, -32768, -32768, 32767, 0, -1]);
    }
    assert_eq!(roundtrip(&samples, 2, 256, 0, 2), samples);
}

#[test]
fn roundtrip_three_channels() {
    // Non-stereo multichannel skips mid/side and predicts per channel.
    let samples = tone(1500, 3, 6000.0);
    assert_eq!(roundtrip(&samples, 3, 512, 0, 2), samples);
}

#[test]
fn roundtrip_empty_input() {
    assert_eq!(roundtrip(&[], 2, 512, 0, 2), Vec::<i16>::new());
}

#[test]
fn roundtrip_constant_silence() {
    let samples = vec![0i16; 5000];
    assert_eq!(roundtrip(&samples, 1, 512, 0, 3), samples);
}

#[test]
fn mid_side_inverts_over_edge_grid() {
    let edges = [
        i16::MIN,
        i16::MIN + 1,
        -1,
        0,
        1,
        i16::MAX - 1,
        i16::MAX,
        12345,
        -12345,
    ];
    for &l in &edges {
        for &r in &edges {
            let (mid, side) = to_mid_side(l, r);
            assert_eq!(from_mid_side(mid, side), (l, r), "L={l} R={r}");
        }
    }
}

#[test]
fn mid_side_inverts_over_random_pairs() {
    let mut rng = Rng(0xBADC_0FFE);
    for _ in 0..100_000 {
        let l = rng.next() as u16 as i16;
        let r = rng.next() as u16 as i16;
        let (mid, side) = to_mid_side(l, r);
        assert_eq!(from_mid_side(mid, side), (l, r), "L={l} R={r}");
    }
}

#[test]
fn encoder_rejects_bad_configuration() {
    assert!(AudioEncoder::new(0, 0, 2).is_err());
    assert!(AudioEncoder::new(512, 0, 4).is_err());
    assert!(AudioEncoder::new(512, 65536, 2).is_err());
}

#[test]
fn encoder_rejects_ragged_input() {
    let encoder = AudioEncoder::new(512, 0, 2).unwrap();
    // 3 samples cannot be 2-channel frames.
    assert!(encoder.encode(&[1, 2, 3], 44100, 2, Vec::new()).is_err());
}

#[test]
fn decoder_rejects_zero_block_m() {
    let samples = tone(600, 1, 4000.0);
    let encoder = AudioEncoder::new(512, 0, 2).unwrap();
    let mut encoded = encoder.encode(&samples, 44100, 1, Vec::new()).unwrap();

    // The first block's 16-bit m field sits right after the 19-byte header.
    encoded[19] = 0;
    encoded[20] = 0;
    let err = AudioDecoder::new().decode(&encoded[..]).unwrap_err();
    assert!(matches!(err, CodecError::CorruptStream(_)), "{err}");
}

#[test]
fn decoder_rejects_truncated_stream() {
    let samples = tone(2000, 2, 8000.0);
    let encoder = AudioEncoder::new(512, 0, 2).unwrap();
    let encoded = encoder.encode(&samples, 44100, 2, Vec::new()).unwrap();

    let truncated = &encoded[..encoded.len() / 2];
    let err = AudioDecoder::new().decode(truncated).unwrap_err();
    assert!(matches!(err, CodecError::CorruptStream(_)), "{err}");
}

#[test]
fn decoder_rejects_empty_input() {
    assert!(AudioDecoder::new().decode(&[][..]).is_err());
}
