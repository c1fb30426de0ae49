// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type of the library.  Every rejected configuration
//! and every failure of the image contract ends up here, so callers
//! only ever have to match on a single enum.

/// Everything that can go wrong while assembling or running a render.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum FractalError {
    /// The image must be at least 2x2 so the pixel grid has a step
    /// size along both axes.
    #[fail(display = "image must be at least 2x2, got {}x{}", _0, _1)]
    ImageSize(usize, usize),

    /// A render needs at least one iteration.
    #[fail(display = "iteration budget must be positive, got {}", _0)]
    MaxIterations(u32),

    /// The escape radius must be finite and greater than one, or the
    /// smoothing logarithm is undefined.
    #[fail(display = "escape radius must be finite and greater than 1, got {}", _0)]
    EscapeRadius(f64),

    /// The lower-left corner of a viewport is not strictly below and to
    /// the left of its upper-right corner.
    #[fail(display = "the left lower corner must be left of and below the right upper corner")]
    ViewportShape,

    /// A viewport width (or camera scale) must be finite and positive.
    #[fail(display = "viewport width must be finite and positive, got {}", _0)]
    ViewportWidth(f64),

    /// A parallel render needs at least one worker.
    #[fail(display = "thread count must be positive, got {}", _0)]
    ThreadCount(usize),

    /// The throwing pixel write was handed an address outside the image.
    #[fail(display = "pixel ({}, {}) is outside the image", x, y)]
    PixelOutOfBounds {
        /// Column of the rejected write.
        x: usize,
        /// Row of the rejected write.
        y: usize,
    },

    /// One of the render workers panicked before finishing its rows.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}
