// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate escapetime;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use escapetime::animation::render_frames;
use escapetime::{
    Camera, Fractal, FractalConfig, Frames, Gradient, IterationBudget, Keyframe, Polynomial, RenderJobBuilder,
    Renderer, Viewport,
};
use failure::Error;
use num::Complex;
use std::fs;
use std::path::Path;
use std::process;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_triple<T>(s: &str, separator: char) -> Option<(T, T, T)>
where
    T: FromStr,
{
    let index = s.rfind(separator)?;
    let (first, second) = parse_pair(&s[..index], separator)?;
    match T::from_str(&s[index + 1..]) {
        Ok(third) => Some((first, second, third)),
        Err(_) => None,
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_triple(s: &str, err: &str) -> Result<(), String> {
    match parse_triple::<f64>(s, ',') {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const RENDER: &str = "render";
const ANIMATE: &str = "animate";

const OUTPUT: &str = "output";
const DIRECTORY: &str = "directory";
const SIZE: &str = "size";
const FRACTAL: &str = "fractal";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const ITERATIONS: &str = "iterations";
const RADIUS: &str = "radius";
const JULIA: &str = "julia";
const THREADS: &str = "threads";
const PALETTE: &str = "palette";
const FRAMES: &str = "frames";
const FROM: &str = "from";
const TO: &str = "to";
const ITERATIONS_FROM: &str = "iterations-from";
const ITERATIONS_TO: &str = "iterations-to";
const ZOOM_BUDGET: &str = "zoom-budget";

const MAX_THREADS: usize = 256;

fn size_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(SIZE)
        .long(SIZE)
        .short("s")
        .takes_value(true)
        .default_value("800x600")
        .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
        .help("Size of output image")
}

fn fractal_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(FRACTAL)
        .long(FRACTAL)
        .short("f")
        .takes_value(true)
        .default_value("mandelbrot")
        .possible_values(&["mandelbrot", "julia", "burning-ship", "tricorn"])
        .help("Which fractal to draw")
}

fn julia_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(JULIA)
        .long(JULIA)
        .short("j")
        .takes_value(true)
        .allow_hyphen_values(true)
        .default_value("-0.8,0.156")
        .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse julia constant"))
        .help("Constant for Julia sets, as re,im")
}

fn threads_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(THREADS)
        .long(THREADS)
        .short("t")
        .takes_value(true)
        .validator(|s| {
            validate_range(
                &s,
                1,
                MAX_THREADS,
                "Could not parse thread count",
                &format!("Thread count must be between 1 and {}", MAX_THREADS),
            )
        })
        .help("Number of threads to use in the renderer [default: one per CPU]")
}

fn iterations_validator(s: String) -> Result<(), String> {
    validate_range(
        &s,
        1u32,
        1_000_000,
        "Could not parse iteration count",
        "Iteration count must be between 1 and 1000000",
    )
}

fn render_command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name(RENDER)
        .about("Render a single image")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the extension picks the format"),
        )
        .arg(size_arg())
        .arg(fractal_arg())
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .conflicts_with(CENTER)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the viewport [default: -2,-1.5]"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .conflicts_with(CENTER)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the viewport [default: 1,1.5]"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .requires(SCALE)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center"))
                .help("Center of the viewport, as re,im"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .takes_value(true)
                .requires(CENTER)
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse scale",
                        "Scale must be positive",
                    )
                })
                .help("Half of the visible width of the plane"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("300")
                .validator(iterations_validator)
                .help("Maximum iterations per pixel"),
        )
        .arg(
            Arg::with_name(RADIUS)
                .long(RADIUS)
                .takes_value(true)
                .default_value("2.0")
                .validator(|s| {
                    validate_range(
                        &s,
                        1.0,
                        std::f64::MAX,
                        "Could not parse escape radius",
                        "Escape radius must be greater than one",
                    )
                })
                .help("Escape radius"),
        )
        .arg(julia_arg())
        .arg(threads_arg())
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .default_value("polynomial")
                .possible_values(&["polynomial", "gradient"])
                .help("Coloring scheme"),
        )
}

fn animate_command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name(ANIMATE)
        .about("Render a zoom between two keyframes, one image per frame")
        .arg(
            Arg::with_name(DIRECTORY)
                .required(true)
                .long(DIRECTORY)
                .short("d")
                .takes_value(true)
                .help("Directory for the frames; created if missing"),
        )
        .arg(size_arg())
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("n")
                .takes_value(true)
                .default_value("60")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Number of frames, both keyframes included"),
        )
        .arg(
            Arg::with_name(FROM)
                .long(FROM)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.75,0,2.5")
                .validator(|s| validate_triple(&s, "Could not parse starting keyframe"))
                .help("Starting camera, as re,im,scale"),
        )
        .arg(
            Arg::with_name(TO)
                .long(TO)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.74364388703,0.13182590421,0.0005")
                .validator(|s| validate_triple(&s, "Could not parse final keyframe"))
                .help("Final camera, as re,im,scale"),
        )
        .arg(
            Arg::with_name(ITERATIONS_FROM)
                .long(ITERATIONS_FROM)
                .takes_value(true)
                .default_value("300")
                .validator(iterations_validator)
                .help("Maximum iterations at the starting keyframe"),
        )
        .arg(
            Arg::with_name(ITERATIONS_TO)
                .long(ITERATIONS_TO)
                .takes_value(true)
                .default_value("300")
                .validator(iterations_validator)
                .help("Maximum iterations at the final keyframe"),
        )
        .arg(
            Arg::with_name(ZOOM_BUDGET)
                .long(ZOOM_BUDGET)
                .takes_value(true)
                .validator(|s| validate_triple(&s, "Could not parse zoom budget"))
                .help("Derive iterations from zoom depth, as base,factor,cap"),
        )
        .arg(fractal_arg())
        .arg(julia_arg())
        .arg(threads_arg())
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("escapetime")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time fractal renderer")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(render_command())
        .subcommand(animate_command())
        .get_matches()
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("Missing value for --{}", name))
}

fn number<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    T::from_str(value(matches, name)?).map_err(|_| format_err!("Could not parse --{}", name))
}

fn complex(matches: &ArgMatches, name: &str) -> Result<Complex<f64>, Error> {
    parse_complex(value(matches, name)?).ok_or_else(|| format_err!("Could not parse --{}", name))
}

fn size(matches: &ArgMatches) -> Result<(usize, usize), Error> {
    parse_pair(value(matches, SIZE)?, 'x').ok_or_else(|| format_err!("Error parsing image dimensions"))
}

fn fractal(matches: &ArgMatches) -> Result<Fractal, Error> {
    Fractal::from_str(value(matches, FRACTAL)?).map_err(|err| format_err!("{}", err))
}

fn threads(matches: &ArgMatches) -> Result<usize, Error> {
    match matches.value_of(THREADS) {
        Some(_) => number(matches, THREADS),
        None => Ok(num_cpus::get()),
    }
}

fn keyframe(matches: &ArgMatches, camera: &str, iterations: &str, julia: Complex<f64>) -> Result<Keyframe, Error> {
    let (re, im, scale) =
        parse_triple(value(matches, camera)?, ',').ok_or_else(|| format_err!("Could not parse --{}", camera))?;
    let config = FractalConfig::new(number(matches, iterations)?, FractalConfig::default().escape_radius)?;
    Ok(Keyframe::new(Camera::new(Complex::new(re, im), scale), config, julia))
}

fn budget(matches: &ArgMatches) -> Result<IterationBudget, Error> {
    match matches.value_of(ZOOM_BUDGET) {
        None => Ok(IterationBudget::Linear),
        Some(s) => {
            let (base, factor, cap) =
                parse_triple::<f64>(s, ',').ok_or_else(|| format_err!("Could not parse --{}", ZOOM_BUDGET))?;
            if !(cap >= 1.0) {
                bail!("The zoom budget cap must be at least one");
            }
            Ok(IterationBudget::Zoom {
                base,
                factor,
                cap: cap.min(f64::from(std::u32::MAX)) as u32,
            })
        }
    }
}

fn run_render(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = size(matches)?;
    let mut builder = RenderJobBuilder::new();
    builder
        .set_image_size(width, height)?
        .set_max_iter(number(matches, ITERATIONS)?)?
        .set_escape_radius(number(matches, RADIUS)?)?;

    if matches.is_present(CENTER) {
        let camera = Camera::new(complex(matches, CENTER)?, number(matches, SCALE)?);
        builder.set_camera(&camera)?;
    } else if matches.is_present(LEFTLOWER) || matches.is_present(RIGHTUPPER) {
        let whole = Viewport::default();
        let leftlower = match matches.value_of(LEFTLOWER) {
            Some(_) => complex(matches, LEFTLOWER)?,
            None => whole.min(),
        };
        let rightupper = match matches.value_of(RIGHTUPPER) {
            Some(_) => complex(matches, RIGHTUPPER)?,
            None => whole.max(),
        };
        builder.set_viewport(Viewport::new(leftlower, rightupper)?);
    }

    let fractal = fractal(matches)?;
    let julia = complex(matches, JULIA)?;
    let threads = threads(matches)?;
    let image = match value(matches, PALETTE)? {
        "gradient" => Renderer::new(Gradient::default(), threads)?.render_preset(fractal, julia, &builder)?,
        _ => Renderer::new(Polynomial, threads)?.render_preset(fractal, julia, &builder)?,
    };

    let output = value(matches, OUTPUT)?;
    image.save(output)?;
    info!("wrote {}", output);
    Ok(())
}

fn run_animate(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = size(matches)?;
    let julia = complex(matches, JULIA)?;
    let from = keyframe(matches, FROM, ITERATIONS_FROM, julia)?;
    let to = keyframe(matches, TO, ITERATIONS_TO, julia)?;
    let frames = Frames::with_budget(from, to, number(matches, FRAMES)?, budget(matches)?);
    let renderer = Renderer::new(Polynomial, threads(matches)?)?;

    let directory = Path::new(value(matches, DIRECTORY)?);
    fs::create_dir_all(directory)?;
    for (index, image) in render_frames(frames, fractal(matches)?, width, height, &renderer).enumerate() {
        let path = directory.join(format!("frame_{:04}.bmp", index));
        image?.save(&path)?;
        debug!("wrote {}", path.display());
    }
    info!("animation written to {}", directory.display());
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    match matches.subcommand() {
        (RENDER, Some(sub)) => run_render(sub),
        (ANIMATE, Some(sub)) => run_animate(sub),
        _ => Err(format_err!("No subcommand given")),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        process::exit(1);
    }
}
