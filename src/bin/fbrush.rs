extern crate clap;
extern crate fractalbrush;
extern crate image;

use clap::{App, Arg, ArgMatches};
use fractalbrush::{Canvas, FractalConfig, Palette};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use std::f64::consts::PI;
use std::fs::File;
use std::path::Path;
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

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
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

fn validate_positive(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) => {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(err.to_string())
            }
        }
        Err(_) => Err(err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const SEED: &str = "seed";
const PALETTE: &str = "palette";
const POWER: &str = "power";
const ITERATIONS: &str = "iterations";
const BRUSHRADIUS: &str = "brush-radius";
const SIGMA: &str = "sigma";
const STROKES: &str = "strokes";
const UPSCALE: &str = "upscale";

fn args<'a>() -> ArgMatches<'a> {
    App::new("fbrush")
        .version("0.1.0")
        .about("Fractal painting demo: paints a Lissajous figure and saves the result")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("720x576")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of the canvas"),
        )
        .arg(
            Arg::with_name(SEED)
                .required(false)
                .long(SEED)
                .takes_value(true)
                .default_value("0")
                .validator(|s| match u64::from_str(&s) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Could not parse noise seed".to_string()),
                })
                .help("Seed for the background noise"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .required(false)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .default_value("grayscale")
                .validator(|s| Palette::from_str(&s).map(|_| ()))
                .help("Palette: grayscale, classic, wolverine, midnight, valentine, zebra, rainbow"),
        )
        .arg(
            Arg::with_name(POWER)
                .required(false)
                .long(POWER)
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        8,
                        "Could not parse polynomial order",
                        "Polynomial order must be between 1 and 8",
                    )
                })
                .help("Polynomial order of the iterated map"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("30")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000",
                    )
                })
                .help("Maximum iteration count"),
        )
        .arg(
            Arg::with_name(BRUSHRADIUS)
                .required(false)
                .long(BRUSHRADIUS)
                .short("b")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        512,
                        "Could not parse brush radius",
                        "Brush radius must be between 1 and 512",
                    )
                })
                .help("Brush support radius in pixels"),
        )
        .arg(
            Arg::with_name(SIGMA)
                .required(false)
                .long(SIGMA)
                .takes_value(true)
                .default_value("26.0")
                .validator(|s| validate_positive(&s, "Noise sigma must be a positive number"))
                .help("Correlation scale of the background noise"),
        )
        .arg(
            Arg::with_name(STROKES)
                .required(false)
                .long(STROKES)
                .takes_value(true)
                .default_value("500")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse stroke count",
                        "Stroke count must be between 1 and 100000",
                    )
                })
                .help("Number of strokes along the demo path"),
        )
        .arg(
            Arg::with_name(UPSCALE)
                .required(false)
                .long(UPSCALE)
                .short("u")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        5,
                        "Could not parse upscale factor",
                        "Upscale factor must be between 1 and 5",
                    )
                })
                .help("Resolution multiplier for the saved image"),
        )
        .get_matches()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let output = File::create(Path::new(outfile))?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn main() {
    let matches = args();
    let (width, height) = parse_pair::<usize>(matches.value_of(SIZE).unwrap(), 'x')
        .expect("Error parsing canvas dimensions");

    let mut config = FractalConfig::default();
    config.width = width;
    config.height = height;
    config.seed = u64::from_str(matches.value_of(SEED).unwrap()).expect("Could not parse seed");
    config.palette = Palette::from_str(matches.value_of(PALETTE).unwrap())
        .expect("Could not parse palette name");
    config.power =
        u32::from_str(matches.value_of(POWER).unwrap()).expect("Could not parse polynomial order");
    config.max_iterations = usize::from_str(matches.value_of(ITERATIONS).unwrap())
        .expect("Could not parse iteration count");
    config.thin_iterations = config.thin_iterations.min(config.max_iterations);
    config.brush_radius = usize::from_str(matches.value_of(BRUSHRADIUS).unwrap())
        .expect("Could not parse brush radius");
    config.noise_sigma =
        f64::from_str(matches.value_of(SIGMA).unwrap()).expect("Could not parse noise sigma");
    let strokes =
        usize::from_str(matches.value_of(STROKES).unwrap()).expect("Could not parse stroke count");
    let upscale = usize::from_str(matches.value_of(UPSCALE).unwrap())
        .expect("Could not parse upscale factor");

    let mut canvas = match Canvas::new(config) {
        Err(e) => {
            eprintln!("Configuration failure: {}", e);
            std::process::exit(1);
        }
        Ok(canvas) => canvas,
    };

    // Stand-in for a pointer: a 3:2 Lissajous figure swept once
    // around the canvas.
    let (w, h) = (canvas.width() as f64, canvas.height() as f64);
    for i in 0..strokes {
        let t = 2.0 * PI * (i as f64) / (strokes as f64);
        let x = 0.5 * w + 0.38 * w * (3.0 * t).sin();
        let y = 0.5 * h + 0.38 * h * (2.0 * t).cos();
        canvas.paint_stroke(x as i32, y as i32);
    }

    let outfile = matches.value_of(OUTPUT).unwrap();
    eprintln!(
        "Saving painting to {} with resolution increased {} times...",
        outfile, upscale
    );
    match canvas.export(upscale) {
        Err(e) => {
            eprintln!("Export failure: {}", e);
            std::process::exit(1);
        }
        Ok(art) => {
            write_image(outfile, &art.pixels, (art.width, art.height)).unwrap();
        }
    }
}
