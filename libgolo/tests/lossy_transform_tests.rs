//! End-to-end tests for the lossy DCT codec.

use libgolo::{CodecError, TransformDecoder, TransformEncoder};

fn sine(len: usize, freq_hz: f64, sample_rate: f64, amplitude: f64) -> Vec<f64> {
    (0..len)
        .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / sample_rate).sin() * amplitude)
        .collect()
}

fn rms_error(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum / a.len() as f64).sqrt()
}

fn roundtrip(samples: &[f64], encoder: TransformEncoder) -> Vec<f64> {
    let encoded = encoder.encode(samples, 44100, Vec::new()).unwrap();
    let decoded = TransformDecoder::new().decode(&encoded[..]).unwrap();
    assert_eq!(decoded.sample_rate, 44100);
    assert_eq!(decoded.samples.len(), samples.len());
    decoded.samples
}

#[test]
fn sine_roundtrip_error_is_small() {
    let samples = sine(10_000, 1000.0, 44100.0, 0.5);
    let decoded = roundtrip(&samples, TransformEncoder::new());
    let err = rms_error(&samples, &decoded);
    assert!(err < 0.01, "rms error {err}");
}

#[test]
fn output_stays_in_unit_range() {
    // Full-scale input; every reconstructed sample must stay in [-1, 1].
    let samples = sine(4096, 440.0, 44100.0, 1.0);
    let decoded = roundtrip(&samples, TransformEncoder::new());
    assert!(decoded.iter().all(|&s| (-1.0..=1.0).contains(&s)));
}

#[test]
fn error_grows_with_coarser_quantization() {
    let samples = sine(8192, 1000.0, 44100.0, 0.5);

    let fine = roundtrip(
        &samples,
        TransformEncoder::new().with_base_step(0.002).unwrap(),
    );
    let coarse = roundtrip(
        &samples,
        TransformEncoder::new().with_base_step(0.02).unwrap(),
    );

    let fine_err = rms_error(&samples, &fine);
    let coarse_err = rms_error(&samples, &coarse);
    assert!(
        fine_err <= coarse_err,
        "fine {fine_err} vs coarse {coarse_err}"
    );
}

#[test]
fn coarser_quantization_shrinks_the_stream() {
    let samples = sine(8192, 1000.0, 44100.0, 0.5);
    let fine = TransformEncoder::new()
        .with_base_step(0.002)
        .unwrap()
        .encode(&samples, 44100, Vec::new())
        .unwrap();
    let coarse = TransformEncoder::new()
        .with_base_step(0.05)
        .unwrap()
        .encode(&samples, 44100, Vec::new())
        .unwrap();
    assert!(coarse.len() < fine.len());
}

#[test]
fn partial_final_block_keeps_length() {
    // 2500 samples: two full blocks plus a 452-sample tail.
    let samples = sine(2500, 500.0, 44100.0, 0.3);
    let decoded = roundtrip(&samples, TransformEncoder::new());
    assert_eq!(decoded.len(), 2500);
}

#[test]
fn silence_roundtrip() {
    let samples = vec![0.0; 3000];
    let decoded = roundtrip(&samples, TransformEncoder::new());
    let err = rms_error(&samples, &decoded);
    assert!(err < 1e-12, "rms error {err}");
}

#[test]
fn empty_input_roundtrip() {
    let encoded = TransformEncoder::new()
        .encode(&[], 44100, Vec::new())
        .unwrap();
    let decoded = TransformDecoder::new().decode(&encoded[..]).unwrap();
    assert!(decoded.samples.is_empty());
}

#[test]
fn encoder_rejects_bad_base_step() {
    assert!(TransformEncoder::new().with_base_step(0.0).is_err());
    assert!(TransformEncoder::new().with_base_step(-0.5).is_err());
}

#[test]
fn decoder_rejects_truncated_stream() {
    let samples = sine(4096, 700.0, 44100.0, 0.4);
    let encoded = TransformEncoder::new()
        .encode(&samples, 44100, Vec::new())
        .unwrap();
    let err = TransformDecoder::new()
        .decode(&encoded[..encoded.len() / 3])
        .unwrap_err();
    assert!(matches!(err, CodecError::CorruptStream(_)), "{err}");
}

#[test]
fn decoder_rejects_empty_input() {
    assert!(TransformDecoder::new().decode(&[][..]).is_err());
}
