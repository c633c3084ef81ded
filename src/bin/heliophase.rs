//! Sun-Earth-Moon phased animation runner
//!
//! Computes heliocentric positions over the requested range, walks the
//! three animation phases, logs each frame's captions and optionally exports
//! the recorded run.
//!
//! Usage:
//!   cargo run --bin heliophase -- --start-date 2024-01-01 --export

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use heliophase::config::RunConfig;
use heliophase::constants::PROGRESS_INTERVAL;
use heliophase::export::JsonExporter;
use heliophase::phases::Phase;
use heliophase::planetlib::{AnalyticEphemeris, PositionProvider, PrecomputedEphemeris};
use heliophase::render::FrameLog;
use heliophase::simulation::Simulation;
use heliophase::Body;

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Sun-Earth-Moon phased animation
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Animates Sun, Earth and Moon in three phases from a chosen start date",
    long_about = None
)]
struct Args {
    /// Start date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    start_date: Option<NaiveDate>,

    /// Run length in days
    #[arg(short, long)]
    days: Option<u32>,

    /// Time step between frames in hours
    #[arg(long)]
    step_hours: Option<u32>,

    /// Export the recorded run
    #[arg(short, long, action = ArgAction::SetTrue)]
    export: bool,

    /// Export file (extension added when missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export playback rate in frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// JSON run configuration; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate every position up front before animating
    #[arg(long, action = ArgAction::SetTrue)]
    precompute: bool,

    /// Write indented JSON when exporting
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Only log warnings and errors (RUST_LOG still takes precedence)
    #[arg(short, long, action = ArgAction::SetTrue)]
    quiet: bool,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}' ({}); use YYYY-MM-DD", s, e))
}

/// Merge the config file (if any) with command line overrides
fn resolve_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(start) = args.start_date {
        config.start_date = start;
    }
    if let Some(days) = args.days {
        config.duration_days = days;
    }
    if let Some(step) = args.step_hours {
        config.step_hours = step;
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if args.output.is_some() {
        config.output = args.output.clone();
    }
    config.export |= args.export;
    Ok(config)
}

fn run(args: &Args, config: RunConfig, provider: &dyn PositionProvider) -> Result<()> {
    let title = format!("Sun-Earth-Moon System (Start: {})", config.start_date);
    let mut renderer = FrameLog::new(title, PROGRESS_INTERVAL);
    let simulation = Simulation::new(config, provider)?;

    let summary = if simulation.config().export {
        let mut exporter = if args.pretty {
            JsonExporter::pretty()
        } else {
            JsonExporter::new()
        };
        simulation.run_with_exporter(&mut renderer, &mut exporter)?
    } else {
        simulation.run(&mut renderer)?
    };

    println!("\nSimulation complete: {} frames", summary.frames_rendered);
    println!("The animation shows three phases:");
    for phase in Phase::ALL {
        let names: Vec<&str> = phase.bodies().iter().map(Body::name).collect();
        println!(
            "  {} [{}] ({} viewport)",
            phase.title(),
            names.join(", "),
            phase.scale()
        );
    }

    if let Some(path) = summary.exported_to() {
        println!("Animation saved as: {}", path.display());
    }
    if let Some(err) = summary.export_error() {
        eprintln!("Could not export animation: {}", err);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = resolve_config(&args)?;
    config.validate()?;

    println!("Start date: {}", config.start_date);
    println!("Duration: {} days", config.duration_days);
    println!("Time step: {} hours", config.step_hours);
    println!("Export: {}", if config.export { "yes" } else { "no" });

    let ephemeris = AnalyticEphemeris::new();
    if args.precompute {
        let grid = config.time_grid()?;
        let table = PrecomputedEphemeris::build(&ephemeris, &grid, &Body::ALL)?;
        run(&args, config, &table)
    } else {
        run(&args, config, &ephemeris)
    }
}
