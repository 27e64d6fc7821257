// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time colorizer.
//!
//! Every pixel's seed value is iterated under `z -> z^k + c` until
//! its magnitude clears the bailout radius or the iteration budget
//! runs out.  A pixel that never escapes belongs to the set's
//! interior and is painted the fixed sentinel color; a pixel that
//! escapes gets a *smooth* escape time -- the integer iteration
//! count plus `exp(1 - |z|/R)`, a fractional correction that
//! interpolates across the bailout boundary so the bands blend
//! instead of stair-stepping.
//!
//! Escape is checked before each update, and an escaped pixel stops
//! iterating on the spot.  That early exit is also the overflow
//! guard: an orbit only ever receives one update past the last
//! magnitude check, so `|z|` stays bounded by `R^k + R` and no orbit
//! can run off to infinity corrupting anything.
//!
//! Iteration runs in two phases.  The first gives every pixel a
//! small number of iterations; in practice most of a stroke window
//! escapes almost immediately or is obviously staying put.  The
//! second gathers the pixels still undecided into a compact worklist
//! and runs only those to full depth, resuming each orbit exactly
//! where the first phase parked it.  Because the recurrence depends
//! only on the stored orbit value, the two-phase split produces
//! bit-identical times to a single unified loop -- a property the
//! tests pin down.

use num::Complex;

use config::FractalConfig;
use palette::{Palette, Rgb};

/// Sentinel escape time for pixels that survive every iteration.
pub const INTERIOR: f64 = -1.0;

/// Interior pixels are always this color, whatever the palette.
const INTERIOR_COLOR: Rgb = [0, 0, 0];

/// Tolerance added to the bailout test.  At small bailout radii a
/// seed can land within rounding distance of the boundary and
/// produce lone mis-colored pixels without this.
const BAILOUT_EPS: f64 = 1e-6;

/// Maps fields of complex seed values to color via iterated
/// polynomial divergence.  Built once from a validated
/// configuration; every method is a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct Colorizer {
    power: u32,
    bailout: f64,
    thin_iterations: usize,
    period: f64,
    palette: Palette,
    julia: Option<Complex<f64>>,
}

/// `z^k` by repeated multiplication.  The orders in play are tiny,
/// and writing it out keeps the k = 2 case the familiar `z * z`.
fn zpow(z: Complex<f64>, k: u32) -> Complex<f64> {
    let mut acc = z;
    for _ in 1..k {
        acc = acc * z;
    }
    acc
}

impl Colorizer {
    /// Build from a configuration the canvas has already validated.
    pub fn new(config: &FractalConfig) -> Colorizer {
        Colorizer {
            power: config.power,
            bailout: config.bailout_radius,
            thin_iterations: config.thin_iterations,
            period: config.color_period,
            palette: config.palette.clone(),
            julia: config.julia_param,
        }
    }

    /// Advance one orbit through iterations `start..end`, returning
    /// its smooth escape time if it escapes in that span.  The orbit
    /// value is left where the span ended, so a later span can
    /// resume it.
    fn iterate_span(
        &self,
        z: &mut Complex<f64>,
        c: Complex<f64>,
        start: usize,
        end: usize,
    ) -> Option<f64> {
        for it in start..end {
            let az = z.norm();
            if az > self.bailout + BAILOUT_EPS {
                return Some(it as f64 + (1.0 - az / self.bailout).exp());
            }
            *z = zpow(*z, self.power) + c;
        }
        None
    }

    /// Smooth escape times for a field of seed values, [`INTERIOR`]
    /// where the orbit never escaped within `max_iterations`.
    pub fn escape_times(&self, seeds: &[Complex<f64>], max_iterations: usize) -> Vec<f64> {
        let thin = self.thin_iterations.min(max_iterations);
        let mut times = vec![INTERIOR; seeds.len()];
        let mut orbits: Vec<Complex<f64>> = seeds.to_vec();

        for (i, z0) in seeds.iter().enumerate() {
            let c = self.julia.unwrap_or(*z0);
            if let Some(t) = self.iterate_span(&mut orbits[i], c, 0, thin) {
                times[i] = t;
            }
        }

        // Only the survivors of the first phase go the full depth.
        let undecided: Vec<usize> = (0..seeds.len()).filter(|&i| times[i] < 0.0).collect();
        for i in undecided {
            let c = self.julia.unwrap_or(seeds[i]);
            if let Some(t) = self.iterate_span(&mut orbits[i], c, thin, max_iterations) {
                times[i] = t;
            }
        }
        times
    }

    /// The unthinned reference loop.  Exists so the tests can pin
    /// the two-phase path to it.
    #[cfg(test)]
    fn escape_times_unified(&self, seeds: &[Complex<f64>], max_iterations: usize) -> Vec<f64> {
        seeds
            .iter()
            .map(|z0| {
                let mut z = *z0;
                let c = self.julia.unwrap_or(*z0);
                self.iterate_span(&mut z, c, 0, max_iterations)
                    .unwrap_or(INTERIOR)
            })
            .collect()
    }

    /// Map one smooth escape time to a color: position within the
    /// current banding cycle, reversed on odd cycles so the palette
    /// sweeps back and forth instead of seaming at each period
    /// boundary.  Interior sentinels come back black.
    pub fn time_to_rgb(&self, t: f64) -> Rgb {
        if t < 0.0 {
            return INTERIOR_COLOR;
        }
        let mut s = (t % self.period) / self.period;
        let cycle = (t / self.period) as u64;
        if cycle % 2 == 1 {
            s = 1.0 - s;
        }
        self.palette.color(s)
    }

    /// The full pipeline: seed values in, colors out.
    pub fn colorize(&self, seeds: &[Complex<f64>], max_iterations: usize) -> Vec<Rgb> {
        self.escape_times(seeds, max_iterations)
            .into_iter()
            .map(|t| self.time_to_rgb(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colorizer(power: u32, bailout: f64, max: usize, thin: usize) -> (Colorizer, usize) {
        let mut cfg = FractalConfig::default();
        cfg.power = power;
        cfg.bailout_radius = bailout;
        cfg.max_iterations = max;
        cfg.thin_iterations = thin;
        cfg.color_period = 2.0;
        (Colorizer::new(&cfg), max)
    }

    #[test]
    fn the_origin_never_escapes_the_mandelbrot_map() {
        let (c, max) = colorizer(2, 2.0, 50, 5);
        let times = c.escape_times(&[Complex::new(0.0, 0.0)], max);
        assert_eq!(times[0], INTERIOR);
        assert_eq!(c.colorize(&[Complex::new(0.0, 0.0)], max)[0], [0, 0, 0]);
    }

    #[test]
    fn a_seed_beyond_bailout_escapes_immediately() {
        let (c, max) = colorizer(2, 2.0, 50, 5);
        let t = c.escape_times(&[Complex::new(3.0, 0.0)], max)[0];
        // Escape at iteration 0 with correction exp(1 - 3/2).
        assert!((t - (-0.5f64).exp()).abs() < 1e-12, "t = {}", t);
    }

    #[test]
    fn smooth_times_are_an_integer_plus_a_fraction_below_one() {
        let (c, max) = colorizer(3, 3.0, 40, 5);
        let seeds: Vec<Complex<f64>> = iproduct!(0..20, 0..20)
            .map(|(i, j)| Complex::new(i as f64 * 0.2 - 2.0, j as f64 * 0.2 - 2.0))
            .collect();
        for t in c.escape_times(&seeds, max) {
            if t != INTERIOR {
                assert!(t >= 0.0);
                let frac = t.fract();
                assert!(frac > 0.0 && frac < 1.0, "fraction {} out of range", frac);
            }
        }
    }

    #[test]
    fn thinned_and_unified_iteration_agree_on_every_pixel() {
        for &(power, thin) in &[(2, 1), (2, 5), (3, 7), (5, 40)] {
            let (c, max) = colorizer(power, 2.5, 40, thin);
            let seeds: Vec<Complex<f64>> = iproduct!(0..32, 0..32)
                .map(|(i, j)| Complex::new(i as f64 * 0.125 - 2.0, j as f64 * 0.125 - 2.0))
                .collect();
            assert_eq!(
                c.escape_times(&seeds, max),
                c.escape_times_unified(&seeds, max)
            );
        }
    }

    #[test]
    fn a_seed_within_the_boundary_tolerance_is_not_rushed_out() {
        let (c, max) = colorizer(2, 2.0, 50, 5);
        // Just over the radius but inside the epsilon band: must not
        // count as escaped at iteration zero.
        let t = c.escape_times(&[Complex::new(2.0000001, 0.0)], max)[0];
        assert!(t >= 1.0, "t = {}", t);
    }

    #[test]
    fn interior_is_black_whatever_the_palette() {
        let mut cfg = FractalConfig::default();
        cfg.palette = Palette::valentine();
        cfg.bailout_radius = 2.0;
        cfg.power = 2;
        let c = Colorizer::new(&cfg);
        assert_eq!(c.colorize(&[Complex::new(0.0, 0.0)], 50)[0], [0, 0, 0]);
    }

    #[test]
    fn banding_reverses_on_odd_cycles() {
        let (c, _) = colorizer(2, 2.0, 30, 5);
        // Period 2: the ramp runs forward on even cycles, backward
        // on odd ones, with no seam at the boundary.
        assert_eq!(c.time_to_rgb(0.0), [255, 255, 255]);
        assert_eq!(c.time_to_rgb(2.0), [0, 0, 0]);
        assert_eq!(c.time_to_rgb(4.0), [255, 255, 255]);
        assert_eq!(c.time_to_rgb(1.0), c.time_to_rgb(3.0));
    }

    #[test]
    fn julia_parameter_replaces_the_seed_as_the_additive_constant() {
        let mut cfg = FractalConfig::default();
        cfg.power = 2;
        cfg.bailout_radius = 2.0;
        cfg.julia_param = Some(Complex::new(0.0, 0.0));
        let c = Colorizer::new(&cfg);
        // Under z -> z^2 + 0 a seed inside the unit disc decays to
        // the origin and never escapes.
        let times = c.escape_times(&[Complex::new(0.5, 0.0)], 60);
        assert_eq!(times[0], INTERIOR);
        // And one outside the unit disc blows up.
        let times = c.escape_times(&[Complex::new(1.5, 0.0)], 60);
        assert!(times[0] >= 0.0);
    }
}
