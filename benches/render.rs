// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;
extern crate escapetime;
extern crate num;

use criterion::Criterion;
use escapetime::kernel::{Julia, Mandelbrot};
use escapetime::{Polynomial, RenderJobBuilder, Renderer};
use num::Complex;

fn builder() -> RenderJobBuilder {
    let mut builder = RenderJobBuilder::new();
    if let Err(e) = builder.set_image_size(320, 240).and_then(|b| b.set_max_iter(250)) {
        panic!("bad benchmark job: {}", e);
    }
    builder
}

fn bench_render(c: &mut Criterion) {
    let builder = builder();
    let single = Renderer::new(Polynomial, 1).unwrap();
    let threaded = Renderer::default();

    c.bench_function("mandelbrot closures, single", |b| {
        let job = builder.build();
        b.iter(|| single.render_single(&job).unwrap())
    });
    c.bench_function("mandelbrot static, single", |b| {
        let job = builder.build_with(Mandelbrot);
        b.iter(|| single.render_single(&job).unwrap())
    });
    c.bench_function("mandelbrot static, threaded", |b| {
        let job = builder.build_with(Mandelbrot);
        b.iter(|| threaded.render(&job).unwrap())
    });
    c.bench_function("julia static, threaded", |b| {
        let job = builder.build_with(Julia(Complex::new(-0.8, 0.156)));
        b.iter(|| threaded.render(&job).unwrap())
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
