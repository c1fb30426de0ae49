// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport, a rectangle on the complex plane, and the
//! PlaneMapper, which relates that rectangle to the integral plane of
//! an image with an origin at 0,0 in its upper-left corner.
//!
//! Image rows grow downward while the imaginary axis grows upward, so
//! row 0 of the image lies on the *maximum* imaginary coordinate of
//! the viewport.
use error::FractalError;
use num::Complex;

/// Describes the x, y of a pixel in an image: column first, then row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of a region
/// of the complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.  Both extents are always strictly positive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    min: Complex<f64>,
    max: Complex<f64>,
}

impl Viewport {
    /// Constructor.  Takes the left-lower and right-upper corners of
    /// the region, and refuses any pair that does not describe a
    /// rectangle of positive area.
    pub fn new(leftlower: Complex<f64>, rightupper: Complex<f64>) -> Result<Viewport, FractalError> {
        let finite = leftlower.re.is_finite()
            && leftlower.im.is_finite()
            && rightupper.re.is_finite()
            && rightupper.im.is_finite();
        // Written so that NaN falls through to the error.
        if !finite || !(rightupper.re > leftlower.re) || !(rightupper.im > leftlower.im) {
            return Err(FractalError::ViewportShape);
        }
        Ok(Viewport {
            min: leftlower,
            max: rightupper,
        })
    }

    /// Builds a viewport around a center point.  The half-height is
    /// derived from the aspect ratio of the image it will be drawn on,
    /// so that pixels stay square.
    pub fn from_center(
        center: Complex<f64>,
        half_width: f64,
        width: usize,
        height: usize,
    ) -> Result<Viewport, FractalError> {
        if !half_width.is_finite() || half_width <= 0.0 {
            return Err(FractalError::ViewportWidth(half_width));
        }
        if width == 0 || height == 0 {
            return Err(FractalError::ImageSize(width, height));
        }
        let half_height = half_width * (height as f64) / (width as f64);
        Viewport::new(
            Complex::new(center.re - half_width, center.im - half_height),
            Complex::new(center.re + half_width, center.im + half_height),
        )
    }

    /// The left-lower corner.
    pub fn min(&self) -> Complex<f64> {
        self.min
    }

    /// The right-upper corner.
    pub fn max(&self) -> Complex<f64> {
        self.max
    }

    /// Extent along the real axis.
    pub fn width(&self) -> f64 {
        self.max.re - self.min.re
    }

    /// Extent along the imaginary axis.
    pub fn height(&self) -> f64 {
        self.max.im - self.min.im
    }

    /// The point halfway between both corners.
    pub fn center(&self) -> Complex<f64> {
        (self.min + self.max) / 2.0
    }
}

impl Default for Viewport {
    /// The region holding the whole Mandelbrot set.
    fn default() -> Viewport {
        Viewport {
            min: Complex::new(-2.0, -1.5),
            max: Complex::new(1.0, 1.5),
        }
    }
}

/// A point of view on the complex plane: where the camera looks, and
/// how far it sees to either side of that point.  `scale` is the
/// half-width of the visible region; smaller means deeper zoom.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// The point at the middle of the picture.
    pub center: Complex<f64>,
    /// Half of the visible width of the plane.
    pub scale: f64,
}

impl Camera {
    /// Constructor.
    pub fn new(center: Complex<f64>, scale: f64) -> Camera {
        Camera { center, scale }
    }
}

/// Turns a camera into the viewport it sees on an image of the given
/// size.
pub fn make_viewport(camera: &Camera, width: usize, height: usize) -> Result<Viewport, FractalError> {
    Viewport::from_center(camera.center, camera.scale, width, height)
}

/// Relates the pixel grid of a `width` x `height` image to a viewport.
/// Column 0 sits on the viewport's left edge, column `width - 1` on its
/// right edge; row 0 on the top edge and row `height - 1` on the
/// bottom edge.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// Number of columns in the image.
    pub width: usize,
    /// Number of rows in the image.
    pub height: usize,
    // Plane coordinate of pixel (0, 0): the left-upper corner.
    origin: Complex<f64>,
    // Distance on the plane between neighbouring columns and rows.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Both sides of the image must be at least two
    /// pixels, otherwise there is no step between the first and last
    /// pixel of an axis.
    pub fn new(width: usize, height: usize, viewport: &Viewport) -> Result<PlaneMapper, FractalError> {
        if width < 2 || height < 2 {
            return Err(FractalError::ImageSize(width, height));
        }
        Ok(PlaneMapper {
            width,
            height,
            origin: Complex::new(viewport.min.re, viewport.max.im),
            steps: (
                viewport.width() / ((width - 1) as f64),
                viewport.height() / ((height - 1) as f64),
            ),
        })
    }

    /// The real and imaginary distance between adjacent pixels.
    pub fn steps(&self) -> (f64, f64) {
        self.steps
    }

    /// Given a pixel on the integral plane, return the point on the
    /// complex plane it samples.
    #[inline]
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        Complex::new(
            self.origin.re + (pixel.0 as f64) * self.steps.0,
            self.origin.im - (pixel.1 as f64) * self.steps.1,
        )
    }

    /// Given a point on the complex plane, return the nearest pixel,
    /// or nothing if the point falls outside the image.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = ((point.re - self.origin.re) / self.steps.0).round();
        let top = ((self.origin.im - point.im) / self.steps.1).round();
        if !(left >= 0.0) || !(top >= 0.0) {
            return None;
        }
        let pixel = Pixel(left as usize, top as usize);
        if pixel.0 >= self.width || pixel.1 >= self.height {
            return None;
        }
        Some(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const EPSILON: f64 = 1e-9;

    fn close(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a.re - b.re).abs() < EPSILON && (a.im - b.im).abs() < EPSILON
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        let vp = Viewport::new(Complex::new(-1.0, 1.0), Complex::new(1.0, -1.0));
        assert_eq!(vp, Err(FractalError::ViewportShape));
        let vp = Viewport::new(Complex::new(1.0, -1.0), Complex::new(-1.0, 1.0));
        assert_eq!(vp, Err(FractalError::ViewportShape));
        let vp = Viewport::new(Complex::new(0.0, 0.0), Complex::new(0.0, 1.0));
        assert_eq!(vp, Err(FractalError::ViewportShape));
        let vp = Viewport::new(Complex::new(std::f64::NAN, 0.0), Complex::new(1.0, 1.0));
        assert_eq!(vp, Err(FractalError::ViewportShape));
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        let vp = Viewport::new(Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap();
        assert_eq!(vp.width(), 3.0);
        assert_eq!(vp.height(), 3.0);
        assert_eq!(vp.center(), Complex::new(-0.5, 0.0));
    }

    #[test]
    fn from_center_keeps_the_aspect_ratio() {
        let vp = Viewport::from_center(Complex::new(-0.75, 0.0), 2.0, 800, 600).unwrap();
        assert!(close(vp.min(), Complex::new(-2.75, -1.5)));
        assert!(close(vp.max(), Complex::new(1.25, 1.5)));
        assert!((vp.width() / vp.height() - 800.0 / 600.0).abs() < EPSILON);
    }

    #[test]
    fn make_viewport_rejects_bad_cameras() {
        let camera = Camera::new(Complex::new(0.0, 0.0), 0.0);
        assert_eq!(make_viewport(&camera, 10, 10), Err(FractalError::ViewportWidth(0.0)));
        let camera = Camera::new(Complex::new(0.0, 0.0), 1.0);
        assert_eq!(make_viewport(&camera, 0, 10), Err(FractalError::ImageSize(0, 10)));
    }

    #[test]
    fn mapper_rejects_degenerate_images() {
        let vp = Viewport::new(Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0)).unwrap();
        assert!(PlaneMapper::new(1, 10, &vp).is_err());
        assert!(PlaneMapper::new(10, 1, &vp).is_err());
        assert!(PlaneMapper::new(2, 2, &vp).is_ok());
    }

    #[test]
    fn pixel_to_point_flips_the_imaginary_axis() {
        let vp = Viewport::new(Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap();
        let pm = PlaneMapper::new(4, 4, &vp).unwrap();
        assert_eq!(pm.steps(), (1.0, 1.0));
        assert_eq!(pm.pixel_to_point(Pixel(0, 0)), Complex::new(-2.0, 1.5));
        assert_eq!(pm.pixel_to_point(Pixel(2, 1)), Complex::new(0.0, 0.5));
        assert_eq!(pm.pixel_to_point(Pixel(3, 3)), Complex::new(1.0, -1.5));
    }

    #[test]
    fn corners_map_to_corners_on_random_viewports() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let min = Complex::new(rng.gen_range(-3.0..1.0), rng.gen_range(-3.0..1.0));
            let max = min + Complex::new(rng.gen_range(1e-6..4.0), rng.gen_range(1e-6..4.0));
            let (width, height) = (rng.gen_range(2..2000), rng.gen_range(2..2000));
            let vp = Viewport::new(min, max).unwrap();
            let pm = PlaneMapper::new(width, height, &vp).unwrap();

            let tolerance = 1e-9 * (1.0 + max.re.abs().max(min.re.abs()));
            let first = pm.pixel_to_point(Pixel(0, 0));
            assert!((first.re - min.re).abs() < tolerance);
            assert!((first.im - max.im).abs() < tolerance);
            let last = pm.pixel_to_point(Pixel(width - 1, height - 1));
            assert!((last.re - max.re).abs() < tolerance);
            assert!((last.im - min.im).abs() < tolerance);
        }
    }

    #[test]
    fn point_to_pixel_inverts_pixel_to_point() {
        let vp = Viewport::new(Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)).unwrap();
        let pm = PlaneMapper::new(641, 481, &vp).unwrap();
        for &(x, y) in &[(0, 0), (320, 240), (640, 480), (17, 400)] {
            let point = pm.pixel_to_point(Pixel(x, y));
            assert_eq!(pm.point_to_pixel(&point), Some(Pixel(x, y)));
        }
        assert_eq!(pm.point_to_pixel(&Complex::new(2.5, 0.0)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 2.5)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(-2.5, 0.0)), None);
    }
}
