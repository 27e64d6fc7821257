// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The brush: a fixed square stamp of intensity weights that a
//! stroke adds into the paint layer.  Weights fall off with the
//! inverse square of the distance from the center, so a stroke is a
//! sharp spike of intensity surrounded by a wide, gentle halo, which
//! is what gives painted lines their soft fractal fringe.

/// Laplace smoothing constant added to the squared distance.  The
/// center cell sits at distance zero; without this the center weight
/// would be a division by zero.
const SMOOTHING: f64 = 1e-7;

/// An immutable square weight matrix of size `(2r + 1)` squared,
/// computed once from `(radius, strength)` and shared by every
/// stroke in a session.
///
/// Weights are zeroed where the squared distance from the center
/// exceeds `r^2` -- half the squared distance to a corner -- so the
/// stamp's support is a disc of radius `r` rather than the full
/// square.
#[derive(Debug, Clone)]
pub struct BrushKernel {
    radius: usize,
    weights: Vec<f64>,
}

impl BrushKernel {
    /// Build a kernel with the given support radius in pixels and
    /// deposit strength.  The caller validates both (the canvas
    /// rejects a zero radius and a non-positive strength at
    /// construction).
    pub fn build(radius: usize, strength: f64) -> BrushKernel {
        let size = 2 * radius + 1;
        let cutoff = (radius * radius) as f64;
        let mut weights = Vec::with_capacity(size * size);
        for (dv, du) in iproduct!(0..size, 0..size) {
            let dy = dv as f64 - radius as f64;
            let dx = du as f64 - radius as f64;
            let d2 = dx * dx + dy * dy;
            if d2 > cutoff {
                weights.push(0.0);
            } else {
                weights.push(strength / (d2 + SMOOTHING));
            }
        }
        BrushKernel { radius, weights }
    }

    /// The support radius the kernel was built with.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Kernel side length, `2 * radius + 1`.
    pub fn size(&self) -> usize {
        2 * self.radius + 1
    }

    /// Weight at row `dv`, column `du` of the stamp.
    pub fn at(&self, du: usize, dv: usize) -> f64 {
        self.weights[dv * self.size() + du]
    }

    /// All weights in row-major order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
