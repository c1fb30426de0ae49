#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal renderer
//!
//! Escape-time fractals (the Mandelbrot set, Julia sets, the Burning
//! Ship and their relatives) take a point on the complex plane and
//! repeatedly apply a recurrence to it, measuring how quickly the
//! result runs off to infinity.  That "velocity" is the number used to
//! color the point; points that never run off are the black heart of
//! the set.
//!
//! This crate maps a rectangle of the complex plane onto the pixels
//! of an image, runs the recurrence for every pixel on a pool of
//! worker threads, refines the iteration count into a continuous
//! escape measure so that the colors come out without bands, and
//! interpolates between camera keyframes to drive zoom animations.
//!
//! ```no_run
//! # extern crate escapetime;
//! # extern crate num;
//! use escapetime::{render, PixelFunctions, RenderJobBuilder};
//! use num::Complex;
//!
//! # fn main() -> Result<(), escapetime::FractalError> {
//! let mut builder = RenderJobBuilder::new();
//! builder
//!     .set_image_size(1920, 1080)?
//!     .set_max_iter(500)?
//!     .set_functions(PixelFunctions::julia(Complex::new(-0.8, 0.156)));
//! let image = render(&builder.build())?;
//! # Ok(())
//! # }
//! ```

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

#[cfg(test)]
extern crate rand;

pub mod animation;
pub mod builder;
pub mod canvas;
pub mod color;
pub mod error;
pub mod kernel;
pub mod planes;
pub mod render;

pub use animation::{interpolate, interpolate_with, Frames, IterationBudget, Keyframe};
pub use builder::{RenderJob, RenderJobBuilder};
pub use canvas::Canvas;
pub use color::{Colorizer, Gradient, Polynomial, INTERIOR};
pub use error::FractalError;
pub use kernel::{escape_time, Escape, Formula, Fractal, FractalConfig, PixelFunctions};
pub use planes::{make_viewport, Camera, Viewport};
pub use render::{render, Renderer};
