//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Operator CLI driving simulation sessions."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use loadalert_common::{init_tracing, AppConfig, SimulatorConfig};
use tracing::debug;

mod render;
mod run;
mod shell;

const CONFIG_CANDIDATES: [&str; 2] = ["loadalert.toml", "configs/loadalert.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "LoadAlert truck load telemetry simulator",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to ./loadalert.toml or $LOADALERT_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Command-line overrides layered over the configuration file.
#[derive(Debug, Default, Args)]
struct Overrides {
    /// Truck identifier tagged on every point
    #[arg(long, global = true)]
    truck: Option<String>,

    /// Overload threshold in tons
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Weight noise in percent (0-10 typical, up to 100 accepted)
    #[arg(long, global = true)]
    noise: Option<f64>,

    /// Points generated per streaming rerun (1-20)
    #[arg(long, global = true)]
    points: Option<usize>,

    /// Start latitude
    #[arg(long, global = true, allow_hyphen_values = true)]
    start_lat: Option<f64>,

    /// Start longitude
    #[arg(long, global = true, allow_hyphen_values = true)]
    start_lon: Option<f64>,

    /// Random seed for reproducible streams
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl Overrides {
    fn apply(&self, config: &mut SimulatorConfig) {
        if let Some(truck) = &self.truck {
            config.truck_id = truck.clone();
        }
        if let Some(threshold) = self.threshold {
            config.threshold_t = threshold;
        }
        if let Some(noise) = self.noise {
            config.noise_pct = noise;
        }
        if let Some(points) = self.points {
            config.points_per_rerun = points;
        }
        if let Some(lat) = self.start_lat {
            config.start_lat = lat;
        }
        if let Some(lon) = self.start_lon {
            config.start_lon = lon;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a scripted session: manual points, streaming reruns, then export
    Run(run::RunArgs),
    /// Interactive session reading one command per line from stdin
    Shell,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => {
            let loaded = AppConfig::load_with_source(&CONFIG_CANDIDATES)?;
            if let Some(source) = &loaded.source {
                debug!(config = %source.display(), "configuration loaded");
            }
            loaded.config
        }
    };
    cli.overrides.apply(&mut config.simulator);
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing("loadalertctl", &config.logging)?;

    match cli.command {
        Commands::Run(args) => run::run(config.simulator, args)?,
        Commands::Shell => shell::run_stdin(config.simulator)?,
    }
    Ok(())
}
