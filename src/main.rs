// src/main.rs - Solve a multi-axis ramp and print its samples
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ramp_rs::output::{write_samples, SampleFormat};
use ramp_rs::{load_config, RampConfig, RampNd};

type BoxError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum Mode {
    /// Time-optimal move with synchronized axes
    #[default]
    MinTime,
    /// Constant-velocity move bounded by the velocity limits
    Linear,
    /// Stop every axis as fast as possible from the start velocity
    Braking,
}

/// Ramp host CLI
#[derive(Parser, Debug)]
#[command(name = "ramp-host", about = "Solve bounded parabolic ramps and sample them.")]
struct Cli {
    /// Path to a TOML config file with per-axis limits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start position, one value per axis
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    start: Vec<f64>,

    /// End position, one value per axis (ignored when braking)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    end: Vec<f64>,

    /// Start velocity per axis (defaults to rest)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    start_velocity: Vec<f64>,

    /// End velocity per axis (defaults to rest)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    end_velocity: Vec<f64>,

    /// Acceleration limit per axis, overrides the config file
    #[arg(long, value_delimiter = ',')]
    amax: Vec<f64>,

    /// Velocity limit per axis, overrides the config file
    #[arg(long, value_delimiter = ',')]
    vmax: Vec<f64>,

    /// Sampling period in seconds
    #[arg(long, default_value_t = 0.01)]
    dt: f64,

    #[arg(long, value_enum, default_value_t = Mode::MinTime)]
    mode: Mode,

    #[arg(long, value_enum, default_value_t = SampleFormat::Csv)]
    format: SampleFormat,

    /// Write samples here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn or_rest(values: Vec<f64>, dims: usize) -> Vec<f64> {
    if values.is_empty() { vec![0.0; dims] } else { values }
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .with_writer(io::stderr)
        .init();

    let config = match cli.config {
        Some(ref path) => {
            let path = path.to_str().ok_or("config path is not valid UTF-8")?;
            tracing::info!("Loading configuration from: {}", path);
            load_config(path)?
        }
        None => RampConfig::default(),
    };

    let dims = cli.start.len();
    let (config_amax, config_vmax) = config.limits();
    let amax = if cli.amax.is_empty() { config_amax } else { cli.amax };
    let vmax = if cli.vmax.is_empty() { config_vmax } else { cli.vmax };

    let end = match cli.mode {
        Mode::Braking => cli.start.clone(),
        _ => cli.end,
    };
    let mut ramp = RampNd::new(
        cli.start,
        or_rest(cli.start_velocity, dims),
        end,
        or_rest(cli.end_velocity, dims),
    )?
    .with_config(&config);

    match cli.mode {
        Mode::MinTime => ramp.solve_min_time(&amax, &vmax)?,
        Mode::Linear => ramp.solve_min_time_linear(&vmax)?,
        Mode::Braking => ramp.solve_braking(&amax)?,
    }
    tracing::info!("Solved {:?} ramp over {} axes, end time {:.6}s", cli.mode, dims, ramp.end_time());

    let count = match cli.output {
        Some(ref path) => {
            let file = BufWriter::new(File::create(path)?);
            write_samples(&ramp, cli.dt, cli.format, file)?
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            let n = write_samples(&ramp, cli.dt, cli.format, &mut lock)?;
            lock.flush()?;
            n
        }
    };
    tracing::debug!("Emitted {} samples", count);
    Ok(())
}
