// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Assembling a render.
//!
//! A `RenderJob` is everything the renderer needs: the size of the
//! image, the viewport it looks at, the iteration budget and escape
//! radius, and the formula.  Jobs are immutable once built.
//!
//! The `RenderJobBuilder` checks every value as it is set, so an
//! invalid job can never be built; a rejected setter leaves the
//! builder exactly as it was.  Changing the size of the image or the
//! width of the viewport recomputes the viewport's height so that
//! pixels stay square.  Building borrows the builder, which can go on
//! to build more jobs afterwards.

use error::FractalError;
use kernel::{FractalConfig, Formula, PixelFunctions};
use num::Complex;
use planes::{make_viewport, Camera, Viewport};
use std::sync::Arc;

/// An immutable description of one image to render.
#[derive(Clone, Debug)]
pub struct RenderJob<F = PixelFunctions> {
    width: usize,
    height: usize,
    viewport: Viewport,
    config: FractalConfig,
    formula: F,
}

impl<F: Formula> RenderJob<F> {
    /// Constructor for callers that already hold every piece.  Applies
    /// the same checks as the builder.
    pub fn new(
        width: usize,
        height: usize,
        viewport: Viewport,
        config: FractalConfig,
        formula: F,
    ) -> Result<RenderJob<F>, FractalError> {
        if width < 2 || height < 2 {
            return Err(FractalError::ImageSize(width, height));
        }
        config.validate()?;
        Ok(RenderJob {
            width,
            height,
            viewport,
            config,
            formula,
        })
    }

    /// Columns of the output image.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows of the output image.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The region of the plane the image covers.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Iteration budget and escape radius.
    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    /// The three per-pixel functions.
    pub fn formula(&self) -> &F {
        &self.formula
    }
}

/// Incrementally assembles a valid `RenderJob`.
#[derive(Clone, Debug)]
pub struct RenderJobBuilder {
    width: usize,
    height: usize,
    viewport: Viewport,
    config: FractalConfig,
    functions: PixelFunctions,
}

impl Default for RenderJobBuilder {
    /// A 256x256 view of the whole Mandelbrot set.
    fn default() -> RenderJobBuilder {
        RenderJobBuilder {
            width: 256,
            height: 256,
            viewport: Viewport::default(),
            config: FractalConfig::default(),
            functions: PixelFunctions::mandelbrot(),
        }
    }
}

impl RenderJobBuilder {
    /// Same as `default()`.
    pub fn new() -> RenderJobBuilder {
        RenderJobBuilder::default()
    }

    /// A viewport of the current real extent around the current
    /// center, with its height derived from the image aspect ratio.
    fn fitted(&self, width: usize, height: usize, real_extent: f64) -> Result<Viewport, FractalError> {
        Viewport::from_center(self.viewport.center(), real_extent / 2.0, width, height)
    }

    /// Sets the number of columns.  At least two.
    pub fn set_image_width(&mut self, width: usize) -> Result<&mut RenderJobBuilder, FractalError> {
        self.set_image_size(width, self.height)
    }

    /// Sets the number of rows.  At least two.
    pub fn set_image_height(&mut self, height: usize) -> Result<&mut RenderJobBuilder, FractalError> {
        self.set_image_size(self.width, height)
    }

    /// Sets both image dimensions at once.
    pub fn set_image_size(&mut self, width: usize, height: usize) -> Result<&mut RenderJobBuilder, FractalError> {
        if width < 2 || height < 2 {
            return Err(FractalError::ImageSize(width, height));
        }
        let viewport = self.fitted(width, height, self.viewport.width())?;
        self.width = width;
        self.height = height;
        self.viewport = viewport;
        Ok(self)
    }

    /// Replaces the viewport as given, without refitting its height.
    pub fn set_viewport(&mut self, viewport: Viewport) -> &mut RenderJobBuilder {
        self.viewport = viewport;
        self
    }

    /// Moves the left-lower corner.  It must stay left of and below the
    /// right-upper one.
    pub fn set_viewport_min(&mut self, min: Complex<f64>) -> Result<&mut RenderJobBuilder, FractalError> {
        self.viewport = Viewport::new(min, self.viewport.max())?;
        Ok(self)
    }

    /// Moves the right-upper corner.  It must stay right of and above
    /// the left-lower one.
    pub fn set_viewport_max(&mut self, max: Complex<f64>) -> Result<&mut RenderJobBuilder, FractalError> {
        self.viewport = Viewport::new(self.viewport.min(), max)?;
        Ok(self)
    }

    /// Sets the real extent of the viewport around its current center
    /// and rederives the imaginary extent from the aspect ratio.
    pub fn set_viewport_width(&mut self, width: f64) -> Result<&mut RenderJobBuilder, FractalError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(FractalError::ViewportWidth(width));
        }
        self.viewport = self.fitted(self.width, self.height, width)?;
        Ok(self)
    }

    /// Moves the viewport without changing its extent.
    pub fn set_viewport_center(&mut self, center: Complex<f64>) -> Result<&mut RenderJobBuilder, FractalError> {
        let shift = center - self.viewport.center();
        self.viewport = Viewport::new(self.viewport.min() + shift, self.viewport.max() + shift)?;
        Ok(self)
    }

    /// Points the viewport where a camera looks.
    pub fn set_camera(&mut self, camera: &Camera) -> Result<&mut RenderJobBuilder, FractalError> {
        self.viewport = make_viewport(camera, self.width, self.height)?;
        Ok(self)
    }

    /// Sets the iteration budget.  Must be positive.
    pub fn set_max_iter(&mut self, max_iter: u32) -> Result<&mut RenderJobBuilder, FractalError> {
        self.config = FractalConfig::new(max_iter, self.config.escape_radius)?;
        Ok(self)
    }

    /// Sets the escape radius.  Must be finite and greater than one.
    pub fn set_escape_radius(&mut self, escape_radius: f64) -> Result<&mut RenderJobBuilder, FractalError> {
        self.config = FractalConfig::new(self.config.max_iter, escape_radius)?;
        Ok(self)
    }

    /// Sets budget and radius together.
    pub fn set_config(&mut self, config: FractalConfig) -> Result<&mut RenderJobBuilder, FractalError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces all three per-pixel functions.
    pub fn set_functions(&mut self, functions: PixelFunctions) -> &mut RenderJobBuilder {
        self.functions = functions;
        self
    }

    /// Replaces the recurrence step.
    pub fn set_iteration_func<F>(&mut self, iterate: F) -> &mut RenderJobBuilder
    where
        F: Fn(Complex<f64>, Complex<f64>) -> Complex<f64> + Send + Sync + 'static,
    {
        self.functions.iterate = Arc::new(iterate);
        self
    }

    /// Replaces the seed function.
    pub fn set_initial_func<F>(&mut self, initial: F) -> &mut RenderJobBuilder
    where
        F: Fn(Complex<f64>) -> Complex<f64> + Send + Sync + 'static,
    {
        self.functions.initial = Arc::new(initial);
        self
    }

    /// Replaces the per-pixel constant function.
    pub fn set_param_func<F>(&mut self, param: F) -> &mut RenderJobBuilder
    where
        F: Fn(Complex<f64>) -> Complex<f64> + Send + Sync + 'static,
    {
        self.functions.param = Arc::new(param);
        self
    }

    /// A job using the stored closures.
    pub fn build(&self) -> RenderJob {
        self.build_with(self.functions.clone())
    }

    /// A job with everything but the formula taken from the builder.
    /// With a concrete formula type the per-pixel calls are static.
    pub fn build_with<F: Formula>(&self, formula: F) -> RenderJob<F> {
        RenderJob {
            width: self.width,
            height: self.height,
            viewport: self.viewport,
            config: self.config,
            formula,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::{escape_time, Julia};

    const EPSILON: f64 = 1e-12;

    #[test]
    fn defaults_cover_the_mandelbrot_set() {
        let job = RenderJobBuilder::default().build();
        assert_eq!((job.width(), job.height()), (256, 256));
        assert_eq!(job.viewport().min(), Complex::new(-2.0, -1.5));
        assert_eq!(job.viewport().max(), Complex::new(1.0, 1.5));
        assert_eq!(*job.config(), FractalConfig::default());
    }

    #[test]
    fn setters_reject_bad_values_and_keep_state() {
        let mut builder = RenderJobBuilder::new();
        assert_eq!(builder.set_image_width(1).err(), Some(FractalError::ImageSize(1, 256)));
        assert_eq!(builder.set_image_height(0).err(), Some(FractalError::ImageSize(256, 0)));
        assert_eq!(builder.set_max_iter(0).err(), Some(FractalError::MaxIterations(0)));
        assert_eq!(builder.set_escape_radius(0.5).err(), Some(FractalError::EscapeRadius(0.5)));
        assert_eq!(builder.set_viewport_width(-1.0).err(), Some(FractalError::ViewportWidth(-1.0)));
        assert_eq!(
            builder.set_viewport_min(Complex::new(2.0, 0.0)).err(),
            Some(FractalError::ViewportShape)
        );
        assert_eq!(
            builder.set_viewport_max(Complex::new(0.0, -2.0)).err(),
            Some(FractalError::ViewportShape)
        );

        let job = builder.build();
        let pristine = RenderJobBuilder::default().build();
        assert_eq!((job.width(), job.height()), (pristine.width(), pristine.height()));
        assert_eq!(job.viewport(), pristine.viewport());
        assert_eq!(job.config(), pristine.config());
    }

    #[test]
    fn resizing_keeps_pixels_square() {
        let mut builder = RenderJobBuilder::new();
        builder.set_image_width(800).unwrap().set_image_height(400).unwrap();
        let job = builder.build();
        let vp = job.viewport();
        assert!((vp.width() - 3.0).abs() < EPSILON);
        assert!((vp.height() - 1.5).abs() < EPSILON);
        assert!((vp.center().re + 0.5).abs() < EPSILON);
        assert!(vp.center().im.abs() < EPSILON);

        builder.set_viewport_width(1.0).unwrap();
        let vp = *builder.build().viewport();
        assert!((vp.width() - 1.0).abs() < EPSILON);
        assert!((vp.height() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn corners_and_center_move_the_viewport() {
        let mut builder = RenderJobBuilder::new();
        builder
            .set_viewport_min(Complex::new(-1.0, -1.0))
            .unwrap()
            .set_viewport_max(Complex::new(1.0, 2.0))
            .unwrap();
        assert_eq!(builder.build().viewport().min(), Complex::new(-1.0, -1.0));
        assert_eq!(builder.build().viewport().max(), Complex::new(1.0, 2.0));

        builder.set_viewport_center(Complex::new(10.0, 10.0)).unwrap();
        let vp = *builder.build().viewport();
        assert_eq!(vp.min(), Complex::new(9.0, 8.5));
        assert_eq!(vp.max(), Complex::new(11.0, 11.5));

        builder
            .set_image_size(400, 200)
            .unwrap()
            .set_camera(&Camera::new(Complex::new(0.0, 0.0), 1.0))
            .unwrap();
        let vp = *builder.build().viewport();
        assert_eq!(vp.min(), Complex::new(-1.0, -0.5));
        assert_eq!(vp.max(), Complex::new(1.0, 0.5));
    }

    #[test]
    fn builder_is_reusable_after_build() {
        let mut builder = RenderJobBuilder::new();
        builder.set_max_iter(50).unwrap();
        let first = builder.build();
        builder.set_max_iter(70).unwrap();
        let second = builder.build();
        assert_eq!(first.config().max_iter, 50);
        assert_eq!(second.config().max_iter, 70);
    }

    #[test]
    fn swapping_one_function_makes_a_julia_set() {
        let k = Complex::new(-0.8, 0.156);
        let mut builder = RenderJobBuilder::new();
        builder.set_initial_func(|pixel| pixel).set_param_func(move |_| k);
        let job = builder.build();
        let reference = builder.build_with(Julia(k));
        for &(re, im) in &[(0.0, 0.0), (0.4, 0.1), (-1.0, 0.3)] {
            let point = Complex::new(re, im);
            assert_eq!(
                escape_time(job.formula(), point, job.config()),
                escape_time(reference.formula(), point, reference.config())
            );
        }
    }

    #[test]
    fn job_constructor_validates() {
        let vp = Viewport::default();
        assert!(RenderJob::new(1, 5, vp, FractalConfig::default(), PixelFunctions::mandelbrot()).is_err());
        let bad = FractalConfig {
            max_iter: 0,
            escape_radius: 2.0,
        };
        assert!(RenderJob::new(5, 5, vp, bad, PixelFunctions::mandelbrot()).is_err());
        assert!(RenderJob::new(5, 5, vp, FractalConfig::default(), PixelFunctions::mandelbrot()).is_ok());
    }
}
