// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The canvas: owner of every image layer and the only mutable state
//! in a painting session.
//!
//! Three layers live here, all padded by the brush radius so a
//! stroke at the canvas edge stays inside the allocation: the unit
//! noise field (generated once, zero in the padding), the intensity
//! layer the strokes accumulate into, and the derived RGB layer.
//! The RGB layer is never the source of truth; any window of it can
//! be rebuilt from the other two, which is exactly what a stroke
//! does.
//!
//! The whole interactivity story is in `paint_stroke`: it touches
//! only the `(2r + 1)` square window under the brush, recolors just
//! those pixels, and hands back a [`RegionDelta`] clipped to the
//! visible canvas so the display layer can blit a small rectangle
//! instead of the whole frame.

use num::Complex;

use brush::BrushKernel;
use buffer::{intensity_to_modulus, IntensityBuffer};
use colorize::Colorizer;
use config::{ConfigError, FractalConfig};
use noise::{normalize, NoiseField};

/// A changed rectangle of the visible canvas: where it sits, how big
/// it is, and its pixels as packed RGB bytes in row-major order.
/// This is the unit of communication with the display layer; blitting
/// one of these after each stroke is what keeps painting interactive.
#[derive(Debug, Clone)]
pub struct RegionDelta {
    /// Column of the region's left edge, in visible-canvas space.
    pub x: usize,
    /// Row of the region's top edge, in visible-canvas space.
    pub y: usize,
    /// Region width in pixels.
    pub width: usize,
    /// Region height in pixels.
    pub height: usize,
    /// `width * height * 3` bytes of RGB data.
    pub pixels: Vec<u8>,
}

/// A painting session: configuration, the three buffered layers, the
/// brush, and the colorizer.  Constructed once from a validated
/// configuration, mutated one stroke at a time, dropped when the
/// session ends.  There is no other state anywhere in the engine.
#[derive(Debug)]
pub struct Canvas {
    config: FractalConfig,
    kernel: BrushKernel,
    colorizer: Colorizer,
    /// Unit noise in the visible interior, zero in the padding.  The
    /// padding never escapes to a display, so its color is arbitrary.
    unit: Vec<Complex<f64>>,
    intensity: IntensityBuffer,
    /// Packed RGB, same padded shape as the other layers.
    rgb: Vec<u8>,
}

impl Canvas {
    /// Start a session.  Validates the configuration, generates the
    /// background noise, and colors the initial frame: with zero
    /// intensity everywhere, every visible pixel's seed sits at the
    /// bailout radius and the correlated noise shows through as the
    /// marbled untouched-canvas texture.
    pub fn new(config: FractalConfig) -> Result<Canvas, ConfigError> {
        config.validate()?;

        let pad = config.brush_radius;
        let (w, h) = (config.width, config.height);
        let kernel = BrushKernel::build(pad, config.brush_strength);
        let colorizer = Colorizer::new(&config);
        let intensity = IntensityBuffer::new(w, h, pad);

        let noise = NoiseField::generate(h, w, config.noise_sigma, config.seed);
        let stride = intensity.padded_width();
        let mut unit = vec![Complex::new(0.0, 0.0); stride * intensity.padded_height()];
        for (y, x) in iproduct!(0..h, 0..w) {
            unit[(y + pad) * stride + (x + pad)] = noise.at(x, y);
        }

        let seeds: Vec<Complex<f64>> = unit
            .iter()
            .zip(intensity.padded())
            .map(|(&u, &i)| u * intensity_to_modulus(i, config.bailout_radius))
            .collect();
        let colors = colorizer.colorize(&seeds, config.max_iterations);
        let mut rgb = vec![0u8; unit.len() * 3];
        for (i, color) in colors.into_iter().enumerate() {
            rgb[i * 3..i * 3 + 3].copy_from_slice(&color);
        }

        Ok(Canvas {
            config,
            kernel,
            colorizer,
            unit,
            intensity,
            rgb,
        })
    }

    /// Visible canvas width in pixels.
    pub fn width(&self) -> usize {
        self.config.width
    }

    /// Visible canvas height in pixels.
    pub fn height(&self) -> usize {
        self.config.height
    }

    /// The accumulated paint layer.
    pub fn intensity(&self) -> &IntensityBuffer {
        &self.intensity
    }

    /// Paint at visible-canvas coordinates `(x, y)`.  Coordinates
    /// outside the canvas are silently ignored -- pointer events
    /// wander off-window all the time and that is not an error --
    /// and return `None` with no state changed.
    ///
    /// A hit deposits the brush into the intensity layer, rebuilds
    /// the seed values for the brush window from intensity and noise,
    /// recolors exactly that window, and returns the changed region
    /// clipped to the visible canvas.
    pub fn paint_stroke(&mut self, x: i32, y: i32) -> Option<RegionDelta> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.config.width || y >= self.config.height {
            return None;
        }

        self.intensity.deposit(x, y, &self.kernel);

        // The brush window's top-left corner in padded coordinates is
        // exactly (x, y): the stroke center is at (x + pad, y + pad)
        // and the kernel reaches pad cells in every direction.
        let pad = self.config.brush_radius;
        let size = 2 * pad + 1;
        let stride = self.intensity.padded_width();
        let mut seeds = Vec::with_capacity(size * size);
        for (dv, du) in iproduct!(0..size, 0..size) {
            let idx = (y + dv) * stride + (x + du);
            let m = intensity_to_modulus(self.intensity.padded()[idx], self.config.bailout_radius);
            seeds.push(self.unit[idx] * m);
        }

        let colors = self.colorizer.colorize(&seeds, self.config.max_iterations);
        for ((dv, du), color) in iproduct!(0..size, 0..size).zip(colors) {
            let idx = ((y + dv) * stride + (x + du)) * 3;
            self.rgb[idx..idx + 3].copy_from_slice(&color);
        }

        // Clip the window to the visible canvas for the display.
        let x0 = x.saturating_sub(pad);
        let y0 = y.saturating_sub(pad);
        let x1 = (x + pad).min(self.config.width - 1);
        let y1 = (y + pad).min(self.config.height - 1);
        let (rw, rh) = (x1 - x0 + 1, y1 - y0 + 1);
        Some(RegionDelta {
            x: x0,
            y: y0,
            width: rw,
            height: rh,
            pixels: self.copy_region(x0, y0, rw, rh),
        })
    }

    /// The full visible frame as `height * width * 3` RGB bytes, for
    /// displays that would rather repaint everything.
    pub fn frame(&self) -> Vec<u8> {
        self.copy_region(0, 0, self.config.width, self.config.height)
    }

    /// Render the current painting at `factor` times the canvas
    /// resolution, without touching the session state.
    ///
    /// The intensity and noise layers are bilinearly upsampled, the
    /// interpolated noise is pushed back onto the unit circle (an
    /// interpolation between two unit vectors lands inside the
    /// circle), and the colorizer reruns over the result with the
    /// iteration budget scaled by the same factor so the extra
    /// resolution picks up real boundary detail.  A factor of 1
    /// reproduces the visible frame byte for byte.
    pub fn export(&self, factor: usize) -> Result<RegionDelta, ConfigError> {
        if factor == 0 {
            return Err(ConfigError::NoUpscale);
        }

        let pad = self.config.brush_radius;
        let (w, h) = (self.config.width, self.config.height);
        let stride = self.intensity.padded_width();
        let mut intensity = Vec::with_capacity(w * h);
        let mut re = Vec::with_capacity(w * h);
        let mut im = Vec::with_capacity(w * h);
        for (y, x) in iproduct!(0..h, 0..w) {
            let idx = (y + pad) * stride + (x + pad);
            intensity.push(self.intensity.padded()[idx]);
            re.push(self.unit[idx].re);
            im.push(self.unit[idx].im);
        }

        let intensity = upsample(&intensity, h, w, factor);
        let re = upsample(&re, h, w, factor);
        let im = upsample(&im, h, w, factor);

        let seeds: Vec<Complex<f64>> = izip!(&intensity, &re, &im)
            .map(|(&i, &re, &im)| {
                let mut u = Complex::new(re, im);
                if factor > 1 {
                    u = normalize(u);
                }
                u * intensity_to_modulus(i, self.config.bailout_radius)
            })
            .collect();

        let colors = self
            .colorizer
            .colorize(&seeds, self.config.max_iterations * factor);
        let mut pixels = Vec::with_capacity(colors.len() * 3);
        for color in colors {
            pixels.extend_from_slice(&color);
        }
        Ok(RegionDelta {
            x: 0,
            y: 0,
            width: w * factor,
            height: h * factor,
            pixels,
        })
    }

    /// Extract a visible-canvas rectangle from the padded RGB layer.
    fn copy_region(&self, x0: usize, y0: usize, rw: usize, rh: usize) -> Vec<u8> {
        let pad = self.config.brush_radius;
        let stride = self.intensity.padded_width();
        let mut out = Vec::with_capacity(rw * rh * 3);
        for row in 0..rh {
            let start = ((y0 + row + pad) * stride + (x0 + pad)) * 3;
            out.extend_from_slice(&self.rgb[start..start + rw * 3]);
        }
        out
    }
}

/// Bilinear upsampling of a scalar field by an integer factor.
/// Output cell `(oy, ox)` samples the input at `(oy / f, ox / f)`,
/// with the neighborhood clamped at the bottom and right edges.  A
/// factor of 1 returns the input unchanged, which is what makes
/// factor-1 export exactly reproduce the on-screen frame.
fn upsample(field: &[f64], height: usize, width: usize, factor: usize) -> Vec<f64> {
    if factor == 1 {
        return field.to_vec();
    }
    let mut out = Vec::with_capacity(height * width * factor * factor);
    for oy in 0..height * factor {
        let sy = oy as f64 / factor as f64;
        let y0 = sy as usize;
        let y1 = (y0 + 1).min(height - 1);
        let fy = sy - y0 as f64;
        for ox in 0..width * factor {
            let sx = ox as f64 / factor as f64;
            let x0 = sx as usize;
            let x1 = (x0 + 1).min(width - 1);
            let fx = sx - x0 as f64;
            out.push(
                (1.0 - fy) * (1.0 - fx) * field[y0 * width + x0]
                    + (1.0 - fy) * fx * field[y0 * width + x1]
                    + fy * (1.0 - fx) * field[y1 * width + x0]
                    + fy * fx * field[y1 * width + x1],
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A configuration small enough to iterate on in a test run.
    fn small_config() -> FractalConfig {
        let mut cfg = FractalConfig::default();
        cfg.width = 32;
        cfg.height = 24;
        cfg.brush_radius = 4;
        cfg.brush_strength = 50.0;
        cfg.noise_sigma = 2.0;
        cfg.max_iterations = 20;
        cfg.thin_iterations = 5;
        cfg.seed = 9;
        cfg
    }

    #[test]
    fn construction_rejects_a_bad_configuration() {
        let mut cfg = small_config();
        cfg.bailout_radius = -1.0;
        assert!(Canvas::new(cfg).is_err());
    }

    #[test]
    fn the_initial_frame_shows_the_background_noise() {
        let canvas = Canvas::new(small_config()).unwrap();
        let frame = canvas.frame();
        assert_eq!(frame.len(), 32 * 24 * 3);
        // Untouched pixels seed at the bailout radius, escape within
        // an iteration or two, and come out colored, not interior.
        assert!(frame.iter().any(|&b| b != 0));
    }

    #[test]
    fn out_of_bounds_strokes_change_nothing() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        let frame = canvas.frame();
        let paint = canvas.intensity().padded().to_vec();
        for &(x, y) in &[(-1, 5), (5, -1), (32, 5), (5, 24), (-100, -100)] {
            assert!(canvas.paint_stroke(x, y).is_none());
        }
        assert_eq!(canvas.frame(), frame);
        assert_eq!(canvas.intensity().padded(), &paint[..]);
    }

    #[test]
    fn a_stroke_reports_the_window_it_touched() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        // Interior stroke: the full brush window.
        let delta = canvas.paint_stroke(16, 12).unwrap();
        assert_eq!((delta.x, delta.y), (12, 8));
        assert_eq!((delta.width, delta.height), (9, 9));
        assert_eq!(delta.pixels.len(), 9 * 9 * 3);
        // Corner stroke: clipped to the visible canvas.
        let delta = canvas.paint_stroke(0, 0).unwrap();
        assert_eq!((delta.x, delta.y), (0, 0));
        assert_eq!((delta.width, delta.height), (5, 5));
    }

    #[test]
    fn the_delta_matches_the_frame_it_came_from() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        let delta = canvas.paint_stroke(10, 10).unwrap();
        let frame = canvas.frame();
        let w = canvas.width();
        for row in 0..delta.height {
            let from_frame = &frame[((delta.y + row) * w + delta.x) * 3..][..delta.width * 3];
            let from_delta = &delta.pixels[row * delta.width * 3..][..delta.width * 3];
            assert_eq!(from_frame, from_delta);
        }
    }

    #[test]
    fn repeated_strokes_accumulate_paint_monotonically() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        canvas.paint_stroke(16, 12).unwrap();
        let before = canvas.intensity().padded().to_vec();
        canvas.paint_stroke(16, 12).unwrap();
        for (a, b) in before.iter().zip(canvas.intensity().padded()) {
            assert!(b >= a);
        }
        assert!(canvas.intensity().value(16, 12) > before_value(&canvas, &before, 16, 12));
    }

    fn before_value(canvas: &Canvas, padded: &[f64], x: usize, y: usize) -> f64 {
        let pad = canvas.intensity().pad();
        padded[(y + pad) * canvas.intensity().padded_width() + (x + pad)]
    }

    #[test]
    fn heavy_paint_turns_interior_black() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        for _ in 0..5 {
            canvas.paint_stroke(16, 12);
        }
        // The stroke center's intensity is enormous, so its seed sits
        // within a whisker of the origin: interior, sentinel black.
        let frame = canvas.frame();
        let idx = (12 * canvas.width() + 16) * 3;
        assert_eq!(&frame[idx..idx + 3], &[0, 0, 0]);
    }

    #[test]
    fn export_at_factor_one_reproduces_the_frame() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        canvas.paint_stroke(20, 6);
        canvas.paint_stroke(8, 15);
        let art = canvas.export(1).unwrap();
        assert_eq!((art.width, art.height), (32, 24));
        assert_eq!(art.pixels, canvas.frame());
    }

    #[test]
    fn export_scales_the_raster_by_the_factor() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        canvas.paint_stroke(16, 12);
        let art = canvas.export(2).unwrap();
        assert_eq!((art.width, art.height), (64, 48));
        assert_eq!(art.pixels.len(), 64 * 48 * 3);
    }

    #[test]
    fn export_rejects_a_zero_factor() {
        let canvas = Canvas::new(small_config()).unwrap();
        assert_eq!(canvas.export(0).unwrap_err(), ConfigError::NoUpscale);
    }

    #[test]
    fn export_does_not_disturb_the_session() {
        let mut canvas = Canvas::new(small_config()).unwrap();
        canvas.paint_stroke(16, 12);
        let frame = canvas.frame();
        let paint = canvas.intensity().padded().to_vec();
        canvas.export(3).unwrap();
        assert_eq!(canvas.frame(), frame);
        assert_eq!(canvas.intensity().padded(), &paint[..]);
    }

    #[test]
    fn upsample_interpolates_between_neighbors() {
        let field = vec![
            0.0, 2.0, //
            4.0, 6.0,
        ];
        let up = upsample(&field, 2, 2, 2);
        assert_eq!(up.len(), 16);
        assert_eq!(up[0], 0.0);
        // Halfway along the top row.
        assert_eq!(up[1], 1.0);
        // Dead center of the original quad.
        assert_eq!(up[5], 3.0);
        // Past the last sample the neighborhood clamps.
        assert_eq!(up[3], 2.0);
        assert_eq!(up[15], 6.0);
    }

    #[test]
    fn upsample_at_factor_one_is_the_identity() {
        let field: Vec<f64> = (0..12).map(|i| i as f64 * 0.37).collect();
        assert_eq!(upsample(&field, 3, 4, 1), field);
    }
}
