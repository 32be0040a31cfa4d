//! simdigi command-line interface.
//!
//! Digitizes directories of simulated event files and inspects single files.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand, ValueEnum};
use simdigi_algorithms::{ConsumePolicy, DigitizationConfig, EnergyField, WindowBound};
use simdigi_io::{digitize_files, inspect_file, plan_jobs, DigitizeJob};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    SimdigiIo(#[from] simdigi_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] simdigi_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exit status when the tree argument names an existing path.
const EXIT_SWAPPED_ARGUMENTS: u8 = 2;
/// Exit status when none of the input directories could be analysed.
const EXIT_NO_DATA: u8 = 3;

/// Accumulated energy field.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EnergyFieldArg {
    /// Deposited energy
    Deposit,
    /// Particle energy
    E,
}

impl From<EnergyFieldArg> for EnergyField {
    fn from(arg: EnergyFieldArg) -> Self {
        match arg {
            EnergyFieldArg::Deposit => EnergyField::Deposit,
            EnergyFieldArg::E => EnergyField::E,
        }
    }
}

/// Window upper bound convention.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowBoundArg {
    /// Hits exactly `spacing` after the window start are inside
    Inclusive,
    /// Hits exactly `spacing` after the window start open the next window
    Exclusive,
}

impl From<WindowBoundArg> for WindowBound {
    fn from(arg: WindowBoundArg) -> Self {
        match arg {
            WindowBoundArg::Inclusive => WindowBound::Inclusive,
            WindowBoundArg::Exclusive => WindowBound::Exclusive,
        }
    }
}

/// Hits consumed by an emitted pulse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConsumeArg {
    /// The whole window
    Window,
    /// Up to and including the threshold crossing
    Prefix,
}

impl From<ConsumeArg> for ConsumePolicy {
    fn from(arg: ConsumeArg) -> Self {
        match arg {
            ConsumeArg::Window => ConsumePolicy::Window,
            ConsumeArg::Prefix => ConsumePolicy::Prefix,
        }
    }
}

/// Digitization settings shared by the subcommands.
#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clustering window length (nanoseconds)
    #[arg(long)]
    spacing_ns: Option<f64>,

    /// Scintillator energy threshold (MeV)
    #[arg(long)]
    scintillator_threshold_mev: Option<f64>,

    /// RPC energy threshold (MeV)
    #[arg(long)]
    rpc_threshold_mev: Option<f64>,

    /// Channels with an ID above this value are RPCs
    #[arg(long)]
    rpc_channel_min: Option<i64>,

    /// Energy field accumulated in a window
    #[arg(long, value_enum)]
    energy_field: Option<EnergyFieldArg>,

    /// Window upper bound convention
    #[arg(long, value_enum)]
    window_bound: Option<WindowBoundArg>,

    /// Hits consumed by an emitted pulse
    #[arg(long, value_enum)]
    consume: Option<ConsumeArg>,
}

impl ConfigArgs {
    fn load(&self) -> Result<DigitizationConfig> {
        let mut config = match &self.config {
            Some(path) => DigitizationConfig::from_file(path)?,
            None => DigitizationConfig::default(),
        };
        if let Some(spacing) = self.spacing_ns {
            config = config.with_spacing_ns(spacing);
        }
        if let Some(mev) = self.scintillator_threshold_mev {
            config = config.with_scintillator_threshold_mev(mev);
        }
        if let Some(mev) = self.rpc_threshold_mev {
            config = config.with_rpc_threshold_mev(mev);
        }
        if let Some(boundary) = self.rpc_channel_min {
            config = config.with_rpc_channel_min(boundary);
        }
        if let Some(field) = self.energy_field {
            config = config.with_energy_field(field.into());
        }
        if let Some(bound) = self.window_bound {
            config = config.with_window_bound(bound.into());
        }
        if let Some(consume) = self.consume {
            config = config.with_consume(consume.into());
        }
        config.validate()?;
        Ok(config)
    }
}

/// Digitizer for simulated particle-detector hits.
#[derive(Parser)]
#[command(name = "simdigi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Digitize every event file found under the given directories
    Digitize {
        /// Name of the event collection to digitize
        tree: String,

        /// Directories to search for event files
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Write outputs here instead of next to each input
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Process files in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Show information about an event file
    Info {
        /// Input event file
        input: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Collects the jobs of every usable directory.
///
/// Returns `None` when no directory could be analysed.
fn collect_jobs(dirs: &[PathBuf], output_dir: Option<&Path>) -> Option<Vec<DigitizeJob>> {
    let mut analysed = 0usize;
    let mut jobs = Vec::new();
    for dir in dirs {
        if !dir.exists() {
            log::error!("{}: no such directory", dir.display());
            continue;
        }
        if !dir.is_dir() {
            log::warn!("{}: not a directory, skipping", dir.display());
            continue;
        }
        match plan_jobs(dir, output_dir) {
            Ok(found) => {
                log::info!("{}: {} event file(s)", dir.display(), found.len());
                analysed += 1;
                jobs.extend(found);
            }
            Err(e) => log::error!("{}: {e}", dir.display()),
        }
    }
    (analysed > 0).then_some(jobs)
}

fn digitize(
    tree: &str,
    dirs: &[PathBuf],
    config: &ConfigArgs,
    output_dir: Option<&Path>,
    parallel: bool,
) -> Result<ExitCode> {
    if Path::new(tree).exists() {
        log::error!(
            "tree name '{}' is an existing path; expected `simdigi digitize <TREE> <DIR>...`",
            tree
        );
        return Ok(ExitCode::from(EXIT_SWAPPED_ARGUMENTS));
    }

    let config = config.load()?;
    log::debug!("configuration: {}", serde_json::to_string(&config)?);

    let Some(jobs) = collect_jobs(dirs, output_dir) else {
        log::error!("no input directory could be analysed");
        return Ok(ExitCode::from(EXIT_NO_DATA));
    };
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).map_err(simdigi_io::Error::from)?;
    }

    let start = Instant::now();
    let results = digitize_files(&jobs, tree, &config, parallel);

    let mut files = 0usize;
    let mut failed = 0usize;
    let mut events = 0usize;
    let mut raw_hits = 0usize;
    let mut pulses = 0usize;
    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(summary) => {
                files += 1;
                events += summary.stats.events;
                raw_hits += summary.stats.raw_hits;
                pulses += summary.stats.pulses;
            }
            Err(e) => {
                failed += 1;
                log::error!("{}: {e}", job.input.display());
            }
        }
    }

    println!(
        "Digitized {} file(s) in {:.2}s ({} skipped)",
        files,
        start.elapsed().as_secs_f64(),
        failed
    );
    println!("Events: {}", events);
    println!("Hits: {} -> pulses: {}", raw_hits, pulses);
    Ok(ExitCode::SUCCESS)
}

fn info(input: &Path, config: &ConfigArgs) -> Result<ExitCode> {
    let config = config.load()?;
    let info = inspect_file(input, &config)?;

    println!("File: {}", input.display());
    println!(
        "Size: {} bytes ({:.2} MB)",
        info.file_size,
        info.file_size as f64 / 1_000_000.0
    );
    println!("Tree: {}", info.header.tree);
    println!("Digitized: {}", info.header.digitized);
    println!("Branches: {}", info.header.branches.join(", "));
    if !info.header.objects.is_empty() {
        let names: Vec<&str> = info.header.objects.keys().map(String::as_str).collect();
        println!("Objects: {}", names.join(", "));
    }
    println!("Records: {}", info.records);
    println!("Hits: {}", info.total_hits);
    println!(
        "Channels: {} scintillator, {} rpc",
        info.scintillator_channels, info.rpc_channels
    );
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Digitize {
            tree,
            dirs,
            config,
            output_dir,
            parallel,
        } => digitize(tree, dirs, config, output_dir.as_deref(), *parallel),
        Commands::Info { input, config } => info(input, config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
