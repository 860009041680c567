//! pillar-track CLI — detect the pillar tip in a frame sequence and track
//! its centroid, writing the results as JSON.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pillar_track::pipeline;
use pillar_track::{Circle, PixelPoint, StartPointParams, TrackParams};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pillar-track")]
#[command(about = "Detect and track a pillar tip across a microscopy frame sequence")]
#[command(version)]
struct Cli {
    /// Log verbosity; repeat for more detail (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the pillar start circle in a single frame.
    Start(StartArgs),

    /// Track from a known start circle across a frame sequence.
    Track(TrackArgs),

    /// Detect in the first frame, then track the whole sequence.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
struct StartArgs {
    /// Path to the frame image.
    #[arg(long)]
    image: PathBuf,

    /// Detection parameters as a JSON file; missing fields use defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Write the detection JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct TrackArgs {
    /// Frame images, in sequence order.
    #[arg(long, num_args = 1.., required = true)]
    frames: Vec<PathBuf>,

    /// Start circle as `x,y,radius`.
    #[arg(long, value_parser = parse_circle)]
    start: Circle,

    /// Tracking parameters as a JSON file; missing fields use defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Write the position table JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Frame images, in sequence order.
    #[arg(long, num_args = 1.., required = true)]
    frames: Vec<PathBuf>,

    /// Detection parameters as a JSON file; missing fields use defaults.
    #[arg(long)]
    detect_params: Option<PathBuf>,

    /// Tracking parameters as a JSON file; missing fields use defaults.
    #[arg(long)]
    track_params: Option<PathBuf>,

    /// Write the report JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Parse `x,y,radius` into a circle.
fn parse_circle(s: &str) -> Result<Circle, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected `x,y,radius`, got `{s}`"));
    }
    let mut values = [0i32; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("`{part}` is not an integer"))?;
    }
    Ok(Circle::new(PixelPoint::new(values[0], values[1]), values[2]))
}

/// Read a parameter file, or fall back to defaults when no path is given.
fn load_params<T: serde::de::DeserializeOwned + Default>(path: &Option<PathBuf>) -> CliResult<T> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(T::default()),
    }
}

fn emit<T: serde::Serialize>(value: &T, out: &Option<PathBuf>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => std::fs::write(path, &json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run_start(args: &StartArgs) -> CliResult<()> {
    let params: StartPointParams = load_params(&args.params)?;
    let detection = pipeline::detect_start_in_file(&args.image, &params)?;
    emit(&detection, &args.out)
}

fn run_track(args: &TrackArgs) -> CliResult<()> {
    let params: TrackParams = load_params(&args.params)?;
    let trajectory = pipeline::track_files(&args.frames, args.start, &params)?;
    emit(&trajectory.to_table(), &args.out)
}

fn run_run(args: &RunArgs) -> CliResult<()> {
    let detect_params: StartPointParams = load_params(&args.detect_params)?;
    let track_params: TrackParams = load_params(&args.track_params)?;
    let report = pipeline::run_files(&args.frames, &detect_params, &track_params)?;
    emit(&report, &args.out)
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) {
    pillar_track::core::init_tracing();
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = pillar_track::core::init_with_level(level);
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Start(args) => run_start(&args),
        Commands::Track(args) => run_track(&args),
        Commands::Run(args) => run_run(&args),
    }
}
