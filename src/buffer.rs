// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The paint layer.  Strokes accumulate here as non-negative
//! intensity, and the buffer is padded on every side by the brush
//! radius so a stamp centered on any visible pixel -- including one
//! hard against an edge -- lands entirely inside the allocation.
//! Nothing ever reads or writes out of bounds, and nothing ever
//! needs a bounds branch in the hot loop.

use brush::BrushKernel;

/// Smoothing constant in the intensity-to-modulus remap, matching
/// the brush's Laplace constant.  Keeps untouched pixels (intensity
/// exactly zero) finite.
const SMOOTHING: f64 = 1e-7;

/// A mutable 2D scalar buffer of shape `(h + 2p) x (w + 2p)`.
/// Values only ever grow under painting; the shape never changes
/// after construction.
#[derive(Debug, Clone)]
pub struct IntensityBuffer {
    width: usize,
    height: usize,
    pad: usize,
    data: Vec<f64>,
}

impl IntensityBuffer {
    /// A zero-filled buffer for a `width` x `height` canvas padded
    /// by `pad` cells on every side.
    pub fn new(width: usize, height: usize, pad: usize) -> IntensityBuffer {
        let data = vec![0.0; (width + 2 * pad) * (height + 2 * pad)];
        IntensityBuffer {
            width,
            height,
            pad,
            data,
        }
    }

    /// Visible canvas width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Visible canvas height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Padding on each side.
    pub fn pad(&self) -> usize {
        self.pad
    }

    /// Total allocated width including padding.
    pub fn padded_width(&self) -> usize {
        self.width + 2 * self.pad
    }

    /// Total allocated height including padding.
    pub fn padded_height(&self) -> usize {
        self.height + 2 * self.pad
    }

    /// The padded cells in row-major order.
    pub fn padded(&self) -> &[f64] {
        &self.data
    }

    /// Intensity at visible-canvas coordinates `(x, y)`.
    pub fn value(&self, x: usize, y: usize) -> f64 {
        self.data[(y + self.pad) * self.padded_width() + (x + self.pad)]
    }

    /// Add the kernel elementwise into the window centered on the
    /// visible pixel `(x, y)`.  The caller guarantees `(x, y)` is in
    /// canvas bounds and the kernel's radius does not exceed the
    /// padding; under those preconditions the window cannot escape
    /// the allocation.
    pub fn deposit(&mut self, x: usize, y: usize, kernel: &BrushKernel) {
        debug_assert!(x < self.width && y < self.height);
        debug_assert!(kernel.radius() <= self.pad);
        let size = kernel.size();
        let top = y + self.pad - kernel.radius();
        let left = x + self.pad - kernel.radius();
        let stride = self.padded_width();
        for (dv, du) in iproduct!(0..size, 0..size) {
            self.data[(top + dv) * stride + (left + du)] += kernel.at(du, dv);
        }
    }
}

/// The inverse-square-root remap from accumulated paint to the
/// modulus of the pixel's seed value.  Zero intensity maps to the
/// bailout radius -- untouched canvas sits just outside the fractal,
/// where the background noise shows -- and heavy paint pushes the
/// modulus toward zero, deep into the interior.  The clamp keeps the
/// colorizer's input bounded.
pub fn intensity_to_modulus(intensity: f64, bailout: f64) -> f64 {
    (1.0 / (intensity + SMOOTHING)).sqrt().min(bailout)
}
