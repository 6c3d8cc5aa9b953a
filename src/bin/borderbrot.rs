// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate borderbrot;
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

use borderbrot::output::write_image;
use borderbrot::RenderConfig;
use clap::{App, Arg, ArgMatches};
use num::Complex;
use std::process;
use std::str::FromStr;
use std::time::Instant;

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
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
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

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const WORKERS: &str = "workers";
const ITERATIONS: &str = "iterations";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("borderbrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot interior renderer: border detection plus flood fill")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("border_image.pgm")
                .help("Output file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.103,-1.238")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.201,1.240")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads each worker uses"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .required(false)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1024,
                        "Could not parse worker count",
                        "Worker count must be between 1 and 1024",
                    )
                })
                .help("Number of workers the rows are split across"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("2000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Escape bound: iterations a point must survive to count as inside"),
        )
        .get_matches()
}

fn config(matches: &ArgMatches) -> Option<RenderConfig> {
    let (width, height) = parse_pair::<usize>(matches.value_of(SIZE)?, 'x')?;
    Some(RenderConfig {
        width,
        height,
        leftlower: parse_complex(matches.value_of(LEFTLOWER)?)?,
        rightupper: parse_complex(matches.value_of(RIGHTUPPER)?)?,
        iterations: usize::from_str(matches.value_of(ITERATIONS)?).ok()?,
        threads: usize::from_str(matches.value_of(THREADS)?).ok()?,
        workers: usize::from_str(matches.value_of(WORKERS)?).ok()?,
    })
}

fn main() {
    env_logger::init();
    let matches = args();
    let config = match config(&matches) {
        Some(config) => config,
        None => {
            eprintln!("Could not read the render parameters");
            process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid parameters: {}", e);
        process::exit(1);
    }
    info!("rendering {:?}", config);

    let started = Instant::now();
    let pixels = match borderbrot::render(&config) {
        Ok(pixels) => pixels,
        Err(e) => {
            eprintln!("Render failure: {}", e);
            process::exit(1);
        }
    };
    let elapsed = started.elapsed();

    let outfile = matches.value_of(OUTPUT).unwrap_or("border_image.pgm");
    if let Err(e) = write_image(outfile, &pixels, config.width, config.height) {
        eprintln!("Could not write {}: {}", outfile, e);
        process::exit(1);
    }
    println!("{:.6}", elapsed.as_secs_f64());
}
