// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Zoom animations.
//!
//! A keyframe is a complete picture: where the camera looks, how far
//! it is zoomed in, the iteration budget and escape radius, and the
//! Julia constant.  An animation is a run of frames interpolated
//! between two keyframes.
//!
//! Positions, radii and the Julia constant move linearly.  The camera
//! scale does not: zooming is perceived multiplicatively, so the scale
//! is interpolated along a geometric path, `a * (b / a)^t`, which
//! magnifies by the same factor every frame.  The iteration budget
//! either moves linearly as well, or is derived from how deep each
//! frame is zoomed.
//!
//! Nothing here checks that `t` lies in `[0, 1]`; values outside it
//! extrapolate past the keyframes.

use builder::RenderJobBuilder;
use color::Colorizer;
use error::FractalError;
use image::RgbImage;
use kernel::{FractalConfig, Fractal};
use num::Complex;
use planes::Camera;
use render::Renderer;

/// One end of an interpolation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Where the camera looks and how far it sees.
    pub camera: Camera,
    /// Iteration budget and escape radius.
    pub config: FractalConfig,
    /// The constant used by Julia sets.
    pub julia: Complex<f64>,
}

impl Keyframe {
    /// Constructor.
    pub fn new(camera: Camera, config: FractalConfig, julia: Complex<f64>) -> Keyframe {
        Keyframe {
            camera,
            config,
            julia,
        }
    }

    /// A builder set up to render this keyframe on a `width` x
    /// `height` image.
    pub fn builder(&self, width: usize, height: usize) -> Result<RenderJobBuilder, FractalError> {
        let mut builder = RenderJobBuilder::new();
        builder
            .set_image_size(width, height)?
            .set_camera(&self.camera)?
            .set_config(self.config)?;
        Ok(builder)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

fn lerp_complex(a: Complex<f64>, b: Complex<f64>, t: f64) -> Complex<f64> {
    Complex::new(lerp(a.re, b.re, t), lerp(a.im, b.im, t))
}

/// Camera scale at `t` on the geometric path from `a` to `b`.
pub fn interpolate_scale(a: f64, b: f64, t: f64) -> f64 {
    a * (b / a).powf(t)
}

/// How the iteration budget of in-between frames is chosen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IterationBudget {
    /// Straight line between the two keyframes' budgets, rounded.
    Linear,
    /// `base + factor * log2(1 / scale)`, rounded and held within
    /// `1..=cap`.  Deeper frames get more iterations.
    Zoom {
        /// Budget at a scale of one.
        base: f64,
        /// Extra iterations per halving of the scale.
        factor: f64,
        /// Upper bound on the budget.
        cap: u32,
    },
}

impl Default for IterationBudget {
    fn default() -> IterationBudget {
        IterationBudget::Linear
    }
}

impl IterationBudget {
    /// The common zoom schedule: 100 iterations plus 50 per halving,
    /// capped at 2000.
    pub fn zoom() -> IterationBudget {
        IterationBudget::Zoom {
            base: 100.0,
            factor: 50.0,
            cap: 2000,
        }
    }

    fn max_iter(&self, a: &Keyframe, b: &Keyframe, t: f64, scale: f64) -> u32 {
        let budget = match *self {
            IterationBudget::Linear => {
                lerp(f64::from(a.config.max_iter), f64::from(b.config.max_iter), t)
            }
            IterationBudget::Zoom { base, factor, cap } => {
                (base + factor * (1.0 / scale).log2()).min(f64::from(cap))
            }
        };
        // Also sends NaN to the floor.
        budget.round().max(1.0).min(f64::from(::std::u32::MAX)) as u32
    }
}

/// The frame at `t` between `a` (at 0) and `b` (at 1), with the
/// iteration budget interpolated linearly.
pub fn interpolate(a: &Keyframe, b: &Keyframe, t: f64) -> Keyframe {
    interpolate_with(a, b, t, &IterationBudget::Linear)
}

/// The frame at `t` between `a` and `b`, with the iteration budget
/// chosen by `budget`.
pub fn interpolate_with(a: &Keyframe, b: &Keyframe, t: f64, budget: &IterationBudget) -> Keyframe {
    let scale = interpolate_scale(a.camera.scale, b.camera.scale, t);
    Keyframe {
        camera: Camera {
            center: lerp_complex(a.camera.center, b.camera.center, t),
            scale,
        },
        config: FractalConfig {
            max_iter: budget.max_iter(a, b, t, scale),
            escape_radius: lerp(a.config.escape_radius, b.config.escape_radius, t),
        },
        julia: lerp_complex(a.julia, b.julia, t),
    }
}

/// Evenly spaced keyframes from `a` to `b`, both included.
#[derive(Clone, Debug)]
pub struct Frames {
    from: Keyframe,
    to: Keyframe,
    budget: IterationBudget,
    count: usize,
    next: usize,
}

impl Frames {
    /// `count` frames with linearly interpolated budgets.  A single
    /// frame is the first keyframe.
    pub fn new(from: Keyframe, to: Keyframe, count: usize) -> Frames {
        Frames::with_budget(from, to, count, IterationBudget::Linear)
    }

    /// `count` frames with the given budget schedule.
    pub fn with_budget(from: Keyframe, to: Keyframe, count: usize, budget: IterationBudget) -> Frames {
        Frames {
            from,
            to,
            budget,
            count,
            next: 0,
        }
    }

    fn time(&self, index: usize) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            index as f64 / (self.count - 1) as f64
        }
    }
}

impl Iterator for Frames {
    type Item = Keyframe;

    fn next(&mut self) -> Option<Keyframe> {
        if self.next >= self.count {
            return None;
        }
        let t = self.time(self.next);
        self.next += 1;
        Some(interpolate_with(&self.from, &self.to, t, &self.budget))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames {}

/// Lazily renders every frame of an animation, one image per frame,
/// in order.  Each frame is a complete threaded render.
pub fn render_frames<'a, C: Colorizer + 'a>(
    frames: Frames,
    fractal: Fractal,
    width: usize,
    height: usize,
    renderer: &'a Renderer<C>,
) -> impl Iterator<Item = Result<RgbImage, FractalError>> + 'a {
    let total = frames.len();
    frames.enumerate().map(move |(index, key)| {
        info!(
            "rendering frame {} / {}: center {}, scale {:e}, max_iter {}",
            index + 1,
            total,
            key.camera.center,
            key.camera.scale,
            key.config.max_iter
        );
        let builder = key.builder(width, height)?;
        renderer.render_preset(fractal, key.julia, &builder)
    })
}
