// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render loop.
//!
//! Every pixel is independent of every other: it reads the job, which
//! is shared read-only, and writes its own slot in the image.  The
//! threaded renderer cuts the image into bands of whole rows and lets
//! a fixed number of workers pull bands off a shared queue until it is
//! empty, so a band of slow interior rows does not hold up the others.
//! The bands are disjoint and together cover the whole image, so no
//! pixel is ever locked.
//!
//! Pixels are written through `try_set_pixel`; a write that somehow
//! lands outside the image is dropped rather than aborting the render.

use builder::{RenderJob, RenderJobBuilder};
use canvas::{bands, Canvas};
use color::{Colorizer, Polynomial};
use crossbeam;
use error::FractalError;
use image::{Rgb, RgbImage};
use itertools::iproduct;
use kernel::{escape_time, BurningShip, Formula, Fractal, Julia, Mandelbrot, Tricorn};
use num::Complex;
use num_cpus;
use planes::{Pixel, PlaneMapper};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Rows handed to a worker at a time.
const ROWS_PER_BAND: usize = 8;

/// Renders a job on every CPU with the default colors.
pub fn render<F: Formula>(job: &RenderJob<F>) -> Result<RgbImage, FractalError> {
    Renderer::default().render(job)
}

/// Drives the kernel and a colorizer over every pixel of a job.
#[derive(Clone, Debug)]
pub struct Renderer<C = Polynomial> {
    colorizer: C,
    threads: usize,
}

impl Default for Renderer<Polynomial> {
    /// One worker per CPU, polynomial colors.
    fn default() -> Renderer<Polynomial> {
        Renderer {
            colorizer: Polynomial,
            threads: num_cpus::get(),
        }
    }
}

impl<C: Colorizer> Renderer<C> {
    /// Constructor.  Needs at least one thread.
    pub fn new(colorizer: C, threads: usize) -> Result<Renderer<C>, FractalError> {
        if threads == 0 {
            return Err(FractalError::ThreadCount(threads));
        }
        Ok(Renderer { colorizer, threads })
    }

    /// The number of workers a threaded render uses.
    pub fn threads(&self) -> usize {
        self.threads
    }

    #[inline]
    fn shade<F: Formula>(&self, job: &RenderJob<F>, mapper: &PlaneMapper, pixel: Pixel) -> Rgb<u8> {
        let max_iter = job.config().max_iter;
        let escape = escape_time(job.formula(), mapper.pixel_to_point(pixel), job.config());
        self.colorizer.colorize(escape.mu(max_iter), max_iter)
    }

    /// Draws every row of a canvas whose row 0 is image row `top`.
    fn draw<F: Formula, K: Canvas>(&self, job: &RenderJob<F>, mapper: &PlaneMapper, canvas: &mut K, top: usize) {
        for row in 0..canvas.height() {
            for column in 0..canvas.width() {
                let color = self.shade(job, mapper, Pixel(column, top + row));
                canvas.try_set_pixel(column, row, color);
            }
        }
    }

    /// The main function for single-threaded rendering, walking the
    /// image pixel by pixel.
    pub fn render_single<F: Formula>(&self, job: &RenderJob<F>) -> Result<RgbImage, FractalError> {
        let mapper = PlaneMapper::new(job.width(), job.height(), job.viewport())?;
        let mut image = RgbImage::new(job.width() as u32, job.height() as u32);
        for (row, column) in iproduct!(0..job.height(), 0..job.width()) {
            let color = self.shade(job, &mapper, Pixel(column, row));
            image.try_set_pixel(column, row, color);
        }
        Ok(image)
    }

    /// The multi-threaded render.
    pub fn render<F: Formula>(&self, job: &RenderJob<F>) -> Result<RgbImage, FractalError> {
        let mapper = PlaneMapper::new(job.width(), job.height(), job.viewport())?;
        let config = job.config();
        info!(
            "rendering {}x{}, max_iter={}, escape_radius={:.2}, threads={}",
            job.width(),
            job.height(),
            config.max_iter,
            config.escape_radius,
            self.threads
        );
        let started = Instant::now();

        let mut image = RgbImage::new(job.width() as u32, job.height() as u32);
        {
            let queue = Mutex::new(bands(&mut image, ROWS_PER_BAND));
            let queue = &queue;
            let mapper = &mapper;
            crossbeam::scope(|spawner| {
                for _ in 0..self.threads {
                    spawner.spawn(move |_| loop {
                        let band = {
                            queue
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .next()
                        };
                        match band {
                            Some(mut band) => {
                                let top = band.top();
                                self.draw(job, mapper, &mut band, top);
                            }
                            None => {
                                break;
                            }
                        }
                    });
                }
            })
            .map_err(|_| FractalError::WorkerPanicked)?;
        }

        let elapsed = started.elapsed();
        info!(
            "render completed in {}.{:03} seconds",
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );
        Ok(image)
    }

    /// Renders one of the preset fractals with the geometry and budget
    /// of a builder.  Each preset gets its own concrete formula type,
    /// so the per-pixel calls are static.
    pub fn render_preset(
        &self,
        fractal: Fractal,
        julia: Complex<f64>,
        builder: &RenderJobBuilder,
    ) -> Result<RgbImage, FractalError> {
        debug!("preset {} with julia parameter {}", fractal, julia);
        match fractal {
            Fractal::Mandelbrot => self.render(&builder.build_with(Mandelbrot)),
            Fractal::Julia => self.render(&builder.build_with(Julia(julia))),
            Fractal::BurningShip => self.render(&builder.build_with(BurningShip)),
            Fractal::Tricorn => self.render(&builder.build_with(Tricorn)),
        }
    }
}
