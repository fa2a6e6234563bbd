//! Orthonormal DCT-II/DCT-III computed through FFT plans.
//!
//! Uses the even/odd reindexing that maps an N-point DCT onto an N-point
//! complex FFT with a post-rotation by `e^(-i*pi*k/2N)`, so a 1024-point
//! block costs O(N log N) instead of the textbook O(N^2) double loop.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// DCT processor for a fixed block length.
pub struct Dct {
    n: usize,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
    /// `e^(-i*pi*k/(2N))` for the forward post-rotation; conjugated on the
    /// inverse path.
    twiddle: Vec<Complex<f64>>,
    /// Orthonormal scaling: `sqrt(1/N)` for k=0, `sqrt(2/N)` otherwise.
    alpha: Vec<f64>,
}

impl Dct {
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "DCT length must be nonzero");

        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(n);
        let fft_inverse = planner.plan_fft_inverse(n);

        let twiddle = (0..n)
            .map(|k| {
                let theta = PI * k as f64 / (2.0 * n as f64);
                Complex::new(theta.cos(), -theta.sin())
            })
            .collect();

        let alpha = (0..n)
            .map(|k| {
                if k == 0 {
                    (1.0 / n as f64).sqrt()
                } else {
                    (2.0 / n as f64).sqrt()
                }
            })
            .collect();

        Dct {
            n,
            fft_forward,
            fft_inverse,
            twiddle,
            alpha,
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Forward DCT-II with orthonormal scaling:
    /// `X[k] = alpha[k] * sum(s[n] * cos(pi*k*(n + 1/2)/N))`.
    pub fn forward(&self, samples: &[f64]) -> Vec<f64> {
        let n = self.n;
        assert_eq!(samples.len(), n, "sample block length mismatch");

        // Even samples ascending in the front half, odd samples descending
        // in the back half.
        let mut buf = vec![Complex::new(0.0, 0.0); n];
        for i in 0..n.div_ceil(2) {
            buf[i] = Complex::new(samples[2 * i], 0.0);
        }
        for i in 0..n / 2 {
            buf[n - 1 - i] = Complex::new(samples[2 * i + 1], 0.0);
        }

        self.fft_forward.process(&mut buf);

        (0..n)
            .map(|k| (buf[k] * self.twiddle[k]).re * self.alpha[k])
            .collect()
    }

    /// Inverse transform (DCT-III) matching [`forward`]:
    /// `s[n] = sum(alpha[k] * X[k] * cos(pi*k*(n + 1/2)/N))`.
    ///
    /// [`forward`]: Dct::forward
    pub fn inverse(&self, coeffs: &[f64]) -> Vec<f64> {
        let n = self.n;
        assert_eq!(coeffs.len(), n, "coefficient block length mismatch");

        // Undo the cosine-basis normalisation: the k-th basis row has
        // squared norm N (k=0) or N/2, which folds together with alpha
        // before the spectrum is rebuilt.
        let scaled: Vec<f64> = (0..n)
            .map(|k| {
                let row_norm = if k == 0 { n as f64 } else { n as f64 / 2.0 };
                coeffs[k] * self.alpha[k] * row_norm
            })
            .collect();

        let mut buf = vec![Complex::new(0.0, 0.0); n];
        buf[0] = Complex::new(scaled[0], 0.0);
        for k in 1..n {
            let spectrum = Complex::new(scaled[k], -scaled[n - k]);
            buf[k] = spectrum * self.twiddle[k].conj();
        }

        self.fft_inverse.process(&mut buf);

        let scale = 1.0 / n as f64;
        let mut output = vec![0.0; n];
        for i in 0..n.div_ceil(2) {
            output[2 * i] = buf[i].re * scale;
        }
        for i in 0..n / 2 {
            output[2 * i + 1] = buf[n - 1 - i].re * scale;
        }
        output
    }
}
