// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use log::info;
use num::Complex;
use std::path::Path;
use std::str::FromStr;

use tilebrot::{
    Curve, FractalParameters, Gradient, PixelRole, Raster, Rectangle, RenderOptions, RenderWindow,
    TileGrid,
};

/// Given a string and a separator, returns the two values
/// separated by the separator.
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

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const RADIUS: &str = "radius";
const SEED: &str = "seed";
const JULIA: &str = "julia";
const TILES: &str = "tiles";
const THREADS: &str = "threads";
const PALETTE: &str = "palette";
const CURVE: &str = "curve";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("tilebrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Tiled escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("512x512")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .allow_hyphen_values(true)
                .short("l")
                .takes_value(true)
                .requires(RIGHTUPPER)
                .conflicts_with_all(&[CENTER, ZOOM])
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the complex plane"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .allow_hyphen_values(true)
                .short("r")
                .takes_value(true)
                .requires(LEFTLOWER)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the complex plane"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .allow_hyphen_values(true)
                .short("c")
                .takes_value(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Center of a square window on the complex plane (default: 0,0)"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse zoom width",
                        "Zoom width must be positive",
                    )
                })
                .help("Side of the square window around the center (default: 2)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("500")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Iteration cap per point"),
        )
        .arg(
            Arg::with_name(RADIUS)
                .long(RADIUS)
                .short("R")
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse escape radius",
                        "Escape radius must be positive",
                    )
                })
                .help("Escape radius"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .allow_hyphen_values(true)
                .takes_value(true)
                .default_value("0,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse seed"))
                .help("Starting z, or c when rendering a Julia set"),
        )
        .arg(
            Arg::with_name(JULIA)
                .long(JULIA)
                .help("Pixels are the starting z and the seed is c"),
        )
        .arg(
            Arg::with_name(TILES)
                .long(TILES)
                .takes_value(true)
                .default_value("8x8")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse tile grid"))
                .help("Tiles across and down"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .possible_values(&["classic", "banded", "grayscale"])
                .default_value("classic")
                .help("Color gradient"),
        )
        .arg(
            Arg::with_name(CURVE)
                .long(CURVE)
                .takes_value(true)
                .possible_values(&["linear", "sqrt"])
                .default_value("linear")
                .help("How iteration counts are spread over the gradient"),
        )
        .get_matches()
}

/// Reads a value clap has already validated.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("Missing value for --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("Could not parse --{} {}", name, raw))
}

fn complex(matches: &ArgMatches, name: &str) -> Result<Complex<f64>, Error> {
    matches
        .value_of(name)
        .and_then(parse_complex)
        .ok_or_else(|| format_err!("Could not parse --{}", name))
}

fn pair<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<(T, T), Error> {
    matches
        .value_of(name)
        .and_then(|s| parse_pair(s, 'x'))
        .ok_or_else(|| format_err!("Could not parse --{}", name))
}

fn write_image(outfile: &str, raster: &Raster) -> Result<(), Error> {
    raster.save(Path::new(outfile))?;
    Ok(())
}

fn run() -> Result<(), Error> {
    let matches = args();

    let (width, height) = pair::<usize>(&matches, SIZE)?;
    let plane = if matches.is_present(LEFTLOWER) {
        Rectangle::from_corners(complex(&matches, LEFTLOWER)?, complex(&matches, RIGHTUPPER)?)?
    } else {
        let center = match matches.value_of(CENTER) {
            Some(_) => complex(&matches, CENTER)?,
            None => Complex::new(0.0, 0.0),
        };
        let zoom = match matches.value_of(ZOOM) {
            Some(_) => value(&matches, ZOOM)?,
            None => 2.0,
        };
        Rectangle::around(center, zoom)?
    };
    let window = RenderWindow::new(plane, width, height)?;

    let role = if matches.is_present(JULIA) {
        PixelRole::Initial
    } else {
        PixelRole::Constant
    };
    let curve = match matches.value_of(CURVE) {
        Some("sqrt") => Curve::Sqrt,
        _ => Curve::Linear,
    };
    let fractal = FractalParameters::new(
        complex(&matches, SEED)?,
        value(&matches, RADIUS)?,
        value(&matches, ITERATIONS)?,
    )?
        .with_role(role)
        .with_curve(curve);

    let palette = matches.value_of(PALETTE).unwrap_or("classic");
    let gradient =
        Gradient::named(palette).ok_or_else(|| format_err!("Unknown palette {}", palette))?;

    let (tiles_x, tiles_y) = pair::<usize>(&matches, TILES)?;
    let options = RenderOptions {
        workers: match matches.value_of(THREADS) {
            Some(_) => value(&matches, THREADS)?,
            None => num_cpus::get(),
        },
        cancel: None,
    };

    let grid = TileGrid::new(tiles_x, tiles_y);
    let raster = tilebrot::render_with(&window, &fractal, &gradient, grid, &options)?;
    let outfile: String = value(&matches, OUTPUT)?;
    write_image(&outfile, &raster)?;
    info!("wrote {}", outfile);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Render failure: {}", e);
        for cause in e.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
