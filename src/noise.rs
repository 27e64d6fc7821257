// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spatially correlated unit noise.
//!
//! The background of a painting is a field of complex numbers, every
//! one of them sitting on the unit circle, whose *phases* drift
//! smoothly across the canvas.  Multiplied by the bailout radius,
//! the field seeds the colorizer with points just outside the
//! fractal set, and the smooth phase drift is what turns into the
//! marbled texture of the untouched canvas.
//!
//! Construction is white noise pushed through a low-pass filter:
//! sample two independent Gaussian fields (one per complex channel),
//! convolve each with a normalized Gaussian bump whose width sets
//! the correlation length, then normalize each combined cell back to
//! unit magnitude.  The same seed always reproduces the same field,
//! bit for bit, which is what makes a whole painting session
//! reproducible.

use num::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use fft::convolve_same;

/// Reseed offset for the imaginary channel.  Any constant works so
/// long as the two channels stay independent; this one is kept for
/// compatibility with fields generated by earlier versions.
const CHANNEL_OFFSET: u64 = 22;

/// Pre-normalization magnitudes below this are considered degenerate
/// and fall back to a fixed direction instead of dividing by zero.
const DEGENERATE: f64 = 1e-12;

/// An immutable field of unit-magnitude complex numbers with tunable
/// spatial correlation.  Generated once per session and never
/// mutated.
#[derive(Debug, Clone)]
pub struct NoiseField {
    width: usize,
    height: usize,
    data: Vec<Complex<f64>>,
}

impl NoiseField {
    /// Generate a `height` x `width` field.  `sigma` is the spatial
    /// correlation scale in pixels: larger values give fewer, larger
    /// features.  The caller is expected to have validated
    /// `sigma > 0` (the canvas does so at construction).
    pub fn generate(height: usize, width: usize, sigma: f64, seed: u64) -> NoiseField {
        let re = smoothed_white(height, width, sigma, seed);
        let im = smoothed_white(height, width, sigma, seed.wrapping_add(CHANNEL_OFFSET));
        let data = re
            .iter()
            .zip(&im)
            .map(|(&r, &i)| normalize(Complex::new(r, i)))
            .collect();
        NoiseField {
            width,
            height,
            data,
        }
    }

    /// Width of the field in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the field in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw cells in row-major order.
    pub fn values(&self) -> &[Complex<f64>] {
        &self.data
    }

    /// The cell at column `x`, row `y`.
    pub fn at(&self, x: usize, y: usize) -> Complex<f64> {
        self.data[y * self.width + x]
    }
}

/// Project a complex number onto the unit circle.  The degenerate
/// case (a cell whose smoothed channels both came out essentially
/// zero) gets angle 0 rather than a division by zero.
pub(crate) fn normalize(z: Complex<f64>) -> Complex<f64> {
    let mag = z.norm();
    if mag < DEGENERATE {
        Complex::new(1.0, 0.0)
    } else {
        z / mag
    }
}

/// One scalar channel: seeded Gaussian white noise smoothed by
/// spectral convolution with an RBF kernel.
fn smoothed_white(height: usize, width: usize, sigma: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let white: Vec<f64> = (0..height * width)
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    let (kernel, ksize) = rbf_kernel(sigma);
    convolve_same(&white, height, width, &kernel, ksize)
}

/// A truncated Gaussian bump, exp(-d^2 / 2 sigma^2), cut off at three
/// standard deviations and normalized to unit sum so smoothing does
/// not change the field's overall scale.
fn rbf_kernel(sigma: f64) -> (Vec<f64>, usize) {
    let r = ((3.0 * sigma).ceil() as usize).max(1);
    let ksize = 2 * r + 1;
    let denom = 2.0 * sigma * sigma;
    let mut weights = Vec::with_capacity(ksize * ksize);
    let mut total = 0.0;
    for (dv, du) in iproduct!(0..ksize, 0..ksize) {
        let dy = dv as f64 - r as f64;
        let dx = du as f64 - r as f64;
        let w = (-(dx * dx + dy * dy) / denom).exp();
        weights.push(w);
        total += w;
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    (weights, ksize)
}
