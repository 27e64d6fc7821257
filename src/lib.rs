#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal painting engine
//!
//! Most fractal renderers treat the complex plane as a fixed window
//! that you zoom and pan around.  This crate turns that relationship
//! inside out: the user *paints* the inputs.  Every brush stroke
//! deposits intensity into a persistent buffer, and the intensity at
//! a pixel decides how far from the fractal set that pixel's seed
//! value sits.  Heavy paint pushes the seed deep toward the interior
//! (black); untouched pixels sit out at the bailout radius, where a
//! precomputed field of spatially correlated unit noise gives the
//! background its marbled texture.  The escape-time colorizer then
//! maps each seed to a color exactly the way a classic multibrot
//! renderer would.
//!
//! The parts fit together like so: a `NoiseField` is generated once
//! per session; a `BrushKernel` is the weight stamp a stroke adds
//! into the intensity layer; the `Canvas` owns all three image
//! layers and recomputes only the window a stroke touched, handing
//! back a `RegionDelta` small enough to blit inside a frame budget.
//! The windowing layer that delivers pointer events and displays
//! bitmaps is somebody else's problem.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
extern crate num;
extern crate rand;
extern crate rand_distr;

pub mod brush;
pub mod buffer;
pub mod canvas;
pub mod colorize;
pub mod config;
pub mod fft;
pub mod noise;
pub mod palette;

pub use brush::BrushKernel;
pub use buffer::IntensityBuffer;
pub use canvas::{Canvas, RegionDelta};
pub use colorize::Colorizer;
pub use config::{ConfigError, FractalConfig};
pub use noise::NoiseField;
pub use palette::{Palette, Rgb};
