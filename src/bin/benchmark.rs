//! Times one acceleration backend.
//!
//! ```text
//! nbody-benchmark <backend> <n> [--repetitions R] [--seed S]
//! ```
//!
//! Prints the median wall-clock time of one evaluation in seconds. Exits 1 with
//! `<ErrorKind>: <message>` on failure, or with a usage line for bad arguments.
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rs_nbody::acceleration::BackendKind;
use rs_nbody::utils::{NBodyError, BENCHMARK_REPETITIONS, DEFAULT_SEED};
use rs_nbody::validation::benchmark;

const USAGE: &str = "usage: nbody-benchmark <backend> <n> [--repetitions R] [--seed S]";

#[derive(Parser, Debug)]
#[command(name = "nbody-benchmark")]
#[command(about = "Times one all-pairs gravitational acceleration backend")]
struct Args {
    /// Registered backend name, e.g. naive-loop or gpu-kernel
    backend: String,

    /// Number of particles
    n: usize,

    /// Timed runs; the median is reported
    #[arg(long, default_value_t = BENCHMARK_REPETITIONS)]
    repetitions: usize,

    /// Seed of the position generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn run(args: &Args) -> Result<f64> {
    let kind: BackendKind = args.backend.parse()?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let report = benchmark(kind, args.n, args.repetitions, &mut rng)
        .with_context(|| format!("benchmarking {} with N = {}", kind, args.n))?;
    Ok(report.median.as_secs_f64())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(seconds) => {
            println!("{}", seconds);
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<NBodyError>() {
                Some(error) => eprintln!("{}: {}", error.kind(), error),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
