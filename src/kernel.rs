// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.
//!
//! Every escape-time fractal is the same loop: take a point on the
//! complex plane, derive a starting value `z` and a constant `c` from
//! it, then apply a recurrence to `z` until it either leaves a circle
//! of radius `escape_radius` or the iteration budget runs out.  The
//! Mandelbrot set seeds `z` with zero and uses the point as `c`; a
//! Julia set seeds `z` with the point and holds `c` fixed.  The three
//! functions that tell one fractal from another are gathered in a
//! `Formula`.
//!
//! Points that run out of budget are *interior*.  For the others, the
//! integer iteration count is refined into a continuous measure `mu`
//! so that neighbouring pixels that escaped on different iterations
//! still get neighbouring colors.

use error::FractalError;
use num::Complex;
use std::f64::consts::LN_2;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Loop termination and level of detail for one render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FractalConfig {
    /// Iteration budget per pixel.
    pub max_iter: u32,
    /// Radius of the circle a point must leave to count as escaped.
    pub escape_radius: f64,
}

impl FractalConfig {
    /// Constructor.  Refuses an empty budget and any radius for which
    /// the smoothing logarithm is undefined.
    pub fn new(max_iter: u32, escape_radius: f64) -> Result<FractalConfig, FractalError> {
        let config = FractalConfig {
            max_iter,
            escape_radius,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks a config assembled by hand, or one produced by
    /// extrapolating between keyframes.
    pub fn validate(&self) -> Result<(), FractalError> {
        if self.max_iter == 0 {
            return Err(FractalError::MaxIterations(self.max_iter));
        }
        if !self.escape_radius.is_finite() || !(self.escape_radius > 1.0) {
            return Err(FractalError::EscapeRadius(self.escape_radius));
        }
        Ok(())
    }
}

impl Default for FractalConfig {
    fn default() -> FractalConfig {
        FractalConfig {
            max_iter: 300,
            escape_radius: 2.0,
        }
    }
}

/// The three pure functions that define an escape-time fractal.
/// Implementors are shared read-only between render workers.
pub trait Formula: Sync {
    /// Seed value of the iterated variable for a point.
    fn initial(&self, pixel: Complex<f64>) -> Complex<f64>;

    /// The constant fed into the recurrence for a point.
    fn param(&self, pixel: Complex<f64>) -> Complex<f64>;

    /// One step of the recurrence.
    fn iterate(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64>;
}

/// z' = z² + c, starting from zero, with the point as `c`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Mandelbrot;

impl Formula for Mandelbrot {
    #[inline]
    fn initial(&self, _pixel: Complex<f64>) -> Complex<f64> {
        Complex::new(0.0, 0.0)
    }

    #[inline]
    fn param(&self, pixel: Complex<f64>) -> Complex<f64> {
        pixel
    }

    #[inline]
    fn iterate(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        z * z + c
    }
}

/// z' = z² + k, starting from the point, for a fixed `k`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Julia(pub Complex<f64>);

impl Formula for Julia {
    #[inline]
    fn initial(&self, pixel: Complex<f64>) -> Complex<f64> {
        pixel
    }

    #[inline]
    fn param(&self, _pixel: Complex<f64>) -> Complex<f64> {
        self.0
    }

    #[inline]
    fn iterate(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        z * z + c
    }
}

/// The Mandelbrot recurrence with both components folded into the
/// positive quadrant before squaring.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BurningShip;

impl Formula for BurningShip {
    #[inline]
    fn initial(&self, _pixel: Complex<f64>) -> Complex<f64> {
        Complex::new(0.0, 0.0)
    }

    #[inline]
    fn param(&self, pixel: Complex<f64>) -> Complex<f64> {
        pixel
    }

    #[inline]
    fn iterate(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        let folded = Complex::new(z.re.abs(), z.im.abs());
        folded * folded + c
    }
}

/// The Mandelbrot recurrence on the conjugate, also called the
/// Mandelbar.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Tricorn;

impl Formula for Tricorn {
    #[inline]
    fn initial(&self, _pixel: Complex<f64>) -> Complex<f64> {
        Complex::new(0.0, 0.0)
    }

    #[inline]
    fn param(&self, pixel: Complex<f64>) -> Complex<f64> {
        pixel
    }

    #[inline]
    fn iterate(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        let conj = z.conj();
        conj * conj + c
    }
}

/// Seed function stored as a value.
pub type InitialFunc = Arc<dyn Fn(Complex<f64>) -> Complex<f64> + Send + Sync>;
/// Per-pixel constant function stored as a value.
pub type ParamFunc = Arc<dyn Fn(Complex<f64>) -> Complex<f64> + Send + Sync>;
/// Recurrence step stored as a value.
pub type IterationFunc = Arc<dyn Fn(Complex<f64>, Complex<f64>) -> Complex<f64> + Send + Sync>;

/// A formula made of three stored closures, so that each of them can
/// be swapped independently.  Cloning shares the closures.
#[derive(Clone)]
pub struct PixelFunctions {
    /// See `Formula::initial`.
    pub initial: InitialFunc,
    /// See `Formula::param`.
    pub param: ParamFunc,
    /// See `Formula::iterate`.
    pub iterate: IterationFunc,
}

impl PixelFunctions {
    /// Wraps three closures.
    pub fn new<I, P, F>(initial: I, param: P, iterate: F) -> PixelFunctions
    where
        I: Fn(Complex<f64>) -> Complex<f64> + Send + Sync + 'static,
        P: Fn(Complex<f64>) -> Complex<f64> + Send + Sync + 'static,
        F: Fn(Complex<f64>, Complex<f64>) -> Complex<f64> + Send + Sync + 'static,
    {
        PixelFunctions {
            initial: Arc::new(initial),
            param: Arc::new(param),
            iterate: Arc::new(iterate),
        }
    }

    /// Splits a formula into its three closures.
    pub fn from_formula<T>(formula: T) -> PixelFunctions
    where
        T: Formula + Send + 'static,
    {
        let formula = Arc::new(formula);
        let (f1, f2, f3) = (formula.clone(), formula.clone(), formula);
        PixelFunctions::new(
            move |pixel| f1.initial(pixel),
            move |pixel| f2.param(pixel),
            move |z, c| f3.iterate(z, c),
        )
    }

    /// The Mandelbrot set.
    pub fn mandelbrot() -> PixelFunctions {
        PixelFunctions::from_formula(Mandelbrot)
    }

    /// The Julia set for `k`.
    pub fn julia(k: Complex<f64>) -> PixelFunctions {
        PixelFunctions::from_formula(Julia(k))
    }

    /// The Burning Ship.
    pub fn burning_ship() -> PixelFunctions {
        PixelFunctions::from_formula(BurningShip)
    }

    /// The Tricorn.
    pub fn tricorn() -> PixelFunctions {
        PixelFunctions::from_formula(Tricorn)
    }
}

impl Default for PixelFunctions {
    fn default() -> PixelFunctions {
        PixelFunctions::mandelbrot()
    }
}

impl fmt::Debug for PixelFunctions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("PixelFunctions { .. }")
    }
}

impl Formula for PixelFunctions {
    #[inline]
    fn initial(&self, pixel: Complex<f64>) -> Complex<f64> {
        (self.initial)(pixel)
    }

    #[inline]
    fn param(&self, pixel: Complex<f64>) -> Complex<f64> {
        (self.param)(pixel)
    }

    #[inline]
    fn iterate(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        (self.iterate)(z, c)
    }
}

/// The preset fractals by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fractal {
    /// See `Mandelbrot`.
    Mandelbrot,
    /// See `Julia`; the constant comes from elsewhere.
    Julia,
    /// See `BurningShip`.
    BurningShip,
    /// See `Tricorn`.
    Tricorn,
}

impl Fractal {
    /// Every preset, in the order the command line lists them.
    pub const ALL: [Fractal; 4] = [
        Fractal::Mandelbrot,
        Fractal::Julia,
        Fractal::BurningShip,
        Fractal::Tricorn,
    ];

    /// The name accepted by `from_str`.
    pub fn name(&self) -> &'static str {
        match *self {
            Fractal::Mandelbrot => "mandelbrot",
            Fractal::Julia => "julia",
            Fractal::BurningShip => "burning-ship",
            Fractal::Tricorn => "tricorn",
        }
    }

    /// The preset as stored closures, using `julia` as the constant
    /// where one is needed.
    pub fn functions(&self, julia: Complex<f64>) -> PixelFunctions {
        match *self {
            Fractal::Mandelbrot => PixelFunctions::mandelbrot(),
            Fractal::Julia => PixelFunctions::julia(julia),
            Fractal::BurningShip => PixelFunctions::burning_ship(),
            Fractal::Tricorn => PixelFunctions::tricorn(),
        }
    }
}

impl fmt::Display for Fractal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fractal {
    type Err = String;

    fn from_str(s: &str) -> Result<Fractal, String> {
        Fractal::ALL
            .iter()
            .find(|fractal| fractal.name() == s)
            .cloned()
            .ok_or_else(|| format!("unknown fractal '{}'", s))
    }
}

/// The fate of one point under the recurrence.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Escape {
    /// Never left the escape circle within the budget.
    Interior,
    /// Left the escape circle.
    Escaped {
        /// Steps applied before `|z|` exceeded the radius.
        iterations: u32,
        /// Continuous refinement of `iterations`, never negative.
        mu: f64,
    },
}

impl Escape {
    /// The continuous escape measure handed to a colorizer.  Interior
    /// points report the full budget.
    pub fn mu(&self, max_iter: u32) -> f64 {
        match *self {
            Escape::Interior => f64::from(max_iter),
            Escape::Escaped { mu, .. } => mu,
        }
    }

    /// True for points that never escaped.
    pub fn is_interior(&self) -> bool {
        *self == Escape::Interior
    }
}

/// Refines an iteration count using the first `z` to leave the escape
/// circle: `mu = n + 1 - log2(log2|z|)`.  Clamped at zero; a NaN from
/// a degenerate radius also comes out as zero.
#[inline]
pub fn smooth(z: Complex<f64>, iterations: u32) -> f64 {
    let log_zn = z.norm_sqr().ln() / 2.0;
    let nu = (log_zn / LN_2).ln() / LN_2;
    (f64::from(iterations) + 1.0 - nu).max(0.0)
}

/// Runs the recurrence for one point of the plane.
#[inline]
pub fn escape_time<F>(formula: &F, point: Complex<f64>, config: &FractalConfig) -> Escape
where
    F: Formula + ?Sized,
{
    let radius_sqr = config.escape_radius * config.escape_radius;
    let mut z = formula.initial(point);
    let c = formula.param(point);

    let mut iterations = 0;
    while iterations < config.max_iter {
        if z.norm_sqr() > radius_sqr {
            break;
        }
        z = formula.iterate(z, c);
        iterations += 1;
    }

    if iterations == config.max_iter {
        Escape::Interior
    } else {
        Escape::Escaped {
            iterations,
            mu: smooth(z, iterations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_iter: u32) -> FractalConfig {
        FractalConfig::new(max_iter, 2.0).unwrap()
    }

    #[test]
    fn config_rejects_bad_values() {
        assert_eq!(FractalConfig::new(0, 2.0), Err(FractalError::MaxIterations(0)));
        assert_eq!(FractalConfig::new(10, 1.0), Err(FractalError::EscapeRadius(1.0)));
        assert_eq!(FractalConfig::new(10, -3.0), Err(FractalError::EscapeRadius(-3.0)));
        assert!(FractalConfig::new(10, std::f64::NAN).is_err());
        assert!(FractalConfig::new(10, std::f64::INFINITY).is_err());
        assert_eq!(FractalConfig::default(), config(300));
    }

    #[test]
    fn origin_never_escapes_the_mandelbrot_set() {
        for &max_iter in &[1, 2, 7, 50, 300, 5000] {
            let escape = escape_time(&Mandelbrot, Complex::new(0.0, 0.0), &config(max_iter));
            assert_eq!(escape, Escape::Interior);
            assert_eq!(escape.mu(max_iter), f64::from(max_iter));
        }
    }

    #[test]
    fn far_points_escape_after_one_step() {
        match escape_time(&Mandelbrot, Complex::new(2.0, 2.0), &config(50)) {
            Escape::Escaped { iterations, mu } => {
                assert_eq!(iterations, 1);
                assert!(mu > 0.0 && mu < 2.0);
            }
            Escape::Interior => panic!("2+2i should escape"),
        }
    }

    #[test]
    fn julia_seeds_with_the_point() {
        let k = Complex::new(-0.8, 0.156);
        // A seed already outside the circle escapes without a single step.
        match escape_time(&Julia(k), Complex::new(3.0, 0.0), &config(50)) {
            Escape::Escaped { iterations, .. } => assert_eq!(iterations, 0),
            Escape::Interior => panic!("3+0i should escape"),
        }
        // Seeded with zero instead, the same neighbourhood stays bounded.
        assert!(escape_time(&Mandelbrot, Complex::new(0.1, 0.0), &config(50)).is_interior());
    }

    #[test]
    fn burning_ship_folds_before_squaring() {
        let z = Complex::new(-1.0, -2.0);
        let c = Complex::new(0.5, 0.5);
        assert_eq!(BurningShip.iterate(z, c), Complex::new(1.0 - 4.0 + 0.5, 4.0 + 0.5));
        assert_eq!(Mandelbrot.iterate(z, c), Complex::new(1.0 - 4.0 + 0.5, 4.0 + 0.5));
        let z = Complex::new(-1.0, 2.0);
        assert_eq!(BurningShip.iterate(z, c), Complex::new(-2.5, 4.5));
        assert_eq!(Mandelbrot.iterate(z, c), Complex::new(-2.5, -3.5));
    }

    #[test]
    fn tricorn_squares_the_conjugate() {
        let z = Complex::new(1.0, 2.0);
        let c = Complex::new(0.0, 0.0);
        assert_eq!(Tricorn.iterate(z, c), Complex::new(-3.0, -4.0));
    }

    #[test]
    fn closures_agree_with_formulas() {
        let k = Complex::new(-0.8, 0.156);
        let functions = PixelFunctions::julia(k);
        let manual = PixelFunctions::new(|p| p, move |_| k, |z, c| z * z + c);
        let cfg = config(200);
        for &(re, im) in &[(0.0, 0.0), (0.3, -0.2), (-1.2, 0.7), (1.5, 1.5)] {
            let point = Complex::new(re, im);
            let expected = escape_time(&Julia(k), point, &cfg);
            assert_eq!(escape_time(&functions, point, &cfg), expected);
            assert_eq!(escape_time(&manual, point, &cfg), expected);
        }
    }

    #[test]
    fn fractal_names_round_trip() {
        for fractal in Fractal::ALL.iter() {
            assert_eq!(fractal.name().parse::<Fractal>(), Ok(*fractal));
        }
        assert!("newton".parse::<Fractal>().is_err());
    }

    #[test]
    fn smoothing_is_continuous_across_iteration_counts() {
        // |z| = 4 after n steps measures the same as |z| = 2 after n - 1.
        let at_four = smooth(Complex::new(4.0, 0.0), 10);
        let at_two = smooth(Complex::new(0.0, 2.0), 9);
        assert!((at_four - 10.0).abs() < 1e-12);
        assert!((at_two - 10.0).abs() < 1e-12);
    }

    #[test]
    fn smoothing_never_goes_negative() {
        assert_eq!(smooth(Complex::new(1e100, 0.0), 0), 0.0);
        assert_eq!(smooth(Complex::new(0.5, 0.0), 0), 0.0);
    }
}
