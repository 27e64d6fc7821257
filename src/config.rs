// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Session configuration.  Everything tunable about a painting
//! session lives in one immutable struct, validated exactly once
//! when the canvas is constructed.  After that point the render
//! path never checks a parameter again: a bad combination is a
//! construction error, not something to discover three strokes in.

use num::Complex;

use palette::Palette;

/// The full parameter set for a painting session.
///
/// The defaults reproduce the classic look: a 720x576 canvas, a
/// third-order multibrot with bailout 3, a wide soft brush, and
/// grayscale banding over the correlated background noise.
#[derive(Debug, Clone)]
pub struct FractalConfig {
    /// Canvas width in pixels.
    pub width: usize,
    /// Canvas height in pixels.
    pub height: usize,
    /// Polynomial order of the iterated map, at least 1.
    pub power: u32,
    /// Magnitude beyond which an orbit counts as divergent.  Values
    /// near or below 2 let the background noise bleed into the
    /// image.
    pub bailout_radius: f64,
    /// Maximum iteration count.  Smaller is faster, coarser.
    pub max_iterations: usize,
    /// Early-exit cutoff: pixels resolved within this many
    /// iterations are excluded from the second, full-depth pass.
    pub thin_iterations: usize,
    /// Brush deposit magnitude.  Larger gives thicker strokes.
    pub brush_strength: f64,
    /// Brush support radius in pixels; also the padding width of the
    /// canvas buffers.
    pub brush_radius: usize,
    /// Escape-time distance covered by one banding cycle.
    pub color_period: f64,
    /// Correlation scale of the background noise, in pixels.
    pub noise_sigma: f64,
    /// RNG seed; the same seed reproduces the same background.
    pub seed: u64,
    /// Color lookup for escaped pixels.
    pub palette: Palette,
    /// When set, iterate `z^k + c` with this fixed `c` (a Julia set)
    /// instead of the pixel's own seed value.
    pub julia_param: Option<Complex<f64>>,
}

impl Default for FractalConfig {
    fn default() -> FractalConfig {
        FractalConfig {
            width: 720,
            height: 576,
            power: 3,
            bailout_radius: 3.0,
            max_iterations: 30,
            thin_iterations: 5,
            brush_strength: 50.0,
            brush_radius: 100,
            color_period: 4.0,
            noise_sigma: 26.0,
            seed: 0,
            palette: Palette::Grayscale,
            julia_param: None,
        }
    }
}

impl FractalConfig {
    /// Check every parameter, returning the first violation.  Called
    /// by `Canvas::new`; render-time code may assume a validated
    /// configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if self.power < 1 {
            return Err(ConfigError::BadPower { power: self.power });
        }
        if !self.bailout_radius.is_finite() || self.bailout_radius <= 0.0 {
            return Err(ConfigError::BadBailout {
                bailout: self.bailout_radius,
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        if self.thin_iterations == 0 || self.thin_iterations > self.max_iterations {
            return Err(ConfigError::BadThin {
                thin: self.thin_iterations,
                max: self.max_iterations,
            });
        }
        if self.brush_radius == 0 {
            return Err(ConfigError::NoBrushRadius);
        }
        if !self.brush_strength.is_finite() || self.brush_strength <= 0.0 {
            return Err(ConfigError::BadBrushStrength {
                strength: self.brush_strength,
            });
        }
        if !self.color_period.is_finite() || self.color_period <= 0.0 {
            return Err(ConfigError::BadPeriod {
                period: self.color_period,
            });
        }
        if !self.noise_sigma.is_finite() || self.noise_sigma <= 0.0 {
            return Err(ConfigError::BadSigma {
                sigma: self.noise_sigma,
            });
        }
        Ok(())
    }
}

/// A rejected configuration.  These are fatal and reported at
/// construction; nothing downstream attempts to recover from one.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// Zero-area canvas.
    #[fail(display = "canvas dimensions must be nonzero, got {}x{}", width, height)]
    EmptyCanvas {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// Polynomial order below 1.
    #[fail(display = "polynomial order must be at least 1, got {}", power)]
    BadPower {
        /// Requested order.
        power: u32,
    },
    /// Non-positive or non-finite bailout radius.
    #[fail(display = "bailout radius must be positive and finite, got {}", bailout)]
    BadBailout {
        /// Requested radius.
        bailout: f64,
    },
    /// Zero maximum iterations.
    #[fail(display = "maximum iteration count must be at least 1")]
    NoIterations,
    /// Thin cutoff outside (0, max].
    #[fail(display = "thin iteration cutoff must be in 1..={}, got {}", max, thin)]
    BadThin {
        /// Requested cutoff.
        thin: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Zero brush radius.
    #[fail(display = "brush radius must be at least 1")]
    NoBrushRadius,
    /// Non-positive or non-finite brush strength.
    #[fail(display = "brush strength must be positive and finite, got {}", strength)]
    BadBrushStrength {
        /// Requested strength.
        strength: f64,
    },
    /// Non-positive or non-finite color period.
    #[fail(display = "color period must be positive and finite, got {}", period)]
    BadPeriod {
        /// Requested period.
        period: f64,
    },
    /// Non-positive or non-finite noise correlation scale.
    #[fail(display = "noise sigma must be positive and finite, got {}", sigma)]
    BadSigma {
        /// Requested sigma.
        sigma: f64,
    },
    /// Export upscale factor of zero.
    #[fail(display = "upscale factor must be at least 1")]
    NoUpscale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_validates() {
        assert!(FractalConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_canvas_is_rejected() {
        let mut cfg = FractalConfig::default();
        cfg.width = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyCanvas {
                width: 0,
                height: 576
            })
        );
    }

    #[test]
    fn zero_order_is_rejected() {
        let mut cfg = FractalConfig::default();
        cfg.power = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::BadPower { power: 0 }));
    }

    #[test]
    fn bad_bailouts_are_rejected() {
        let mut cfg = FractalConfig::default();
        cfg.bailout_radius = 0.0;
        assert!(cfg.validate().is_err());
        cfg.bailout_radius = ::std::f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn thin_cutoff_must_fit_under_the_maximum() {
        let mut cfg = FractalConfig::default();
        cfg.thin_iterations = cfg.max_iterations + 1;
        assert!(cfg.validate().is_err());
        cfg.thin_iterations = 0;
        assert!(cfg.validate().is_err());
        cfg.thin_iterations = cfg.max_iterations;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn brush_parameters_are_checked() {
        let mut cfg = FractalConfig::default();
        cfg.brush_radius = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NoBrushRadius));
        cfg = FractalConfig::default();
        cfg.brush_strength = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn errors_render_their_offending_values() {
        let err = ConfigError::BadThin { thin: 9, max: 5 };
        assert_eq!(format!("{}", err), "thin iteration cutoff must be in 1..=5, got 9");
    }
}
