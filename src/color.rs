// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colorizers turn the continuous escape measure of a pixel into a
//! color.  Anything at or beyond the iteration budget is interior and
//! painted black; everything else is mapped through `t = mu / max_iter`
//! onto a continuous ramp, so the smooth escape measure produces smooth
//! gradients instead of bands.

use image::Rgb;
use num::clamp;

/// The color of points that never escaped.
pub const INTERIOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Maps an escape measure to a color.  Must be total over `mu >= 0`.
///
/// Any `Fn(f64, u32) -> Rgb<u8>` closure is a colorizer as well.
pub trait Colorizer: Sync {
    /// Colors one pixel given its escape measure and the budget it was
    /// computed with.
    fn colorize(&self, mu: f64, max_iter: u32) -> Rgb<u8>;
}

impl<F> Colorizer for F
where
    F: Fn(f64, u32) -> Rgb<u8> + Sync,
{
    fn colorize(&self, mu: f64, max_iter: u32) -> Rgb<u8> {
        self(mu, max_iter)
    }
}

/// Position of an escaped pixel on the ramp, in `[0, 1]`.  NaN, which
/// a degenerate escape radius can produce, lands on the start.
fn ramp(mu: f64, max_iter: u32) -> f64 {
    let t = mu / f64::from(max_iter);
    if t.is_nan() {
        0.0
    } else {
        clamp(t, 0.0, 1.0)
    }
}

#[inline]
fn channel(value: f64) -> u8 {
    clamp(value * 255.0, 0.0, 255.0) as u8
}

/// Three Bernstein-like polynomials in `t`, one per channel: blue peaks
/// early, green in the middle and red late.  Every channel is zero at
/// both ends of the ramp.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Polynomial;

impl Colorizer for Polynomial {
    fn colorize(&self, mu: f64, max_iter: u32) -> Rgb<u8> {
        if mu >= f64::from(max_iter) {
            return INTERIOR;
        }
        let t = ramp(mu, max_iter);
        let s = 1.0 - t;
        Rgb([
            channel(9.0 * s * t * t * t),
            channel(15.0 * s * s * t * t),
            channel(8.5 * s * s * s * t),
        ])
    }
}

/// A piecewise-linear ramp through a list of evenly spaced color
/// stops.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<[f64; 3]>,
}

impl Gradient {
    /// Builds a gradient from channel triples in `[0, 1]`.  Needs at
    /// least two stops.
    pub fn new(stops: Vec<[f64; 3]>) -> Option<Gradient> {
        if stops.len() < 2 {
            return None;
        }
        Some(Gradient { stops })
    }
}

impl Default for Gradient {
    /// Deep blue through white and amber back to near-black.
    fn default() -> Gradient {
        Gradient {
            stops: vec![
                [0.0, 0.03, 0.39],
                [0.13, 0.42, 0.80],
                [0.93, 1.0, 1.0],
                [1.0, 0.67, 0.0],
                [0.5, 0.1, 0.05],
                [0.0, 0.01, 0.0],
            ],
        }
    }
}

impl Colorizer for Gradient {
    fn colorize(&self, mu: f64, max_iter: u32) -> Rgb<u8> {
        if mu >= f64::from(max_iter) {
            return INTERIOR;
        }
        let scaled = ramp(mu, max_iter) * (self.stops.len() - 1) as f64;
        let index = (scaled as usize).min(self.stops.len() - 2);
        let frac = scaled - index as f64;
        let (from, to) = (self.stops[index], self.stops[index + 1]);
        Rgb([
            channel(from[0] + (to[0] - from[0]) * frac),
            channel(from[1] + (to[1] - from[1]) * frac),
            channel(from[2] + (to[2] - from[2]) * frac),
        ])
    }
}
