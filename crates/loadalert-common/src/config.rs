//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the simulator runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};
use thiserror::Error;
use tracing::{debug, warn};

use crate::logging::LogFormat;

/// Upper bound applied to the streaming batch size.
pub const MAX_POINTS_PER_RERUN: usize = 20;

/// Upper bound accepted for the weight jitter percentage.
pub const MAX_NOISE_PCT: f64 = 100.0;

fn default_truck_id() -> String {
    "KA01AB1234".to_owned()
}

fn default_threshold() -> f64 {
    10.0
}

fn default_noise_pct() -> f64 {
    1.0
}

fn default_points_per_rerun() -> usize {
    3
}

fn default_start_lat() -> f64 {
    12.9716
}

fn default_start_lon() -> f64 {
    77.5946
}

fn default_stream_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_initial_baseline() -> f64 {
    8.0
}

fn default_burst_probability() -> f64 {
    0.08
}

fn default_window_len() -> usize {
    30
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Validation failures raised for simulator settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("overload threshold must be greater than zero (got {0})")]
    InvalidThreshold(f64),
    #[error("weight noise must be between 0 and 100 percent (got {0})")]
    InvalidNoise(f64),
    #[error("batch size must be between 1 and {max} (got {0})", max = MAX_POINTS_PER_RERUN)]
    InvalidBatchSize(usize),
    #[error("burst probability must be between 0 and 1 (got {0})")]
    InvalidBurstProbability(f64),
    #[error("trailing window must hold at least one point (got {0})")]
    InvalidWindow(usize),
    #[error("truck identifier cannot be empty")]
    EmptyTruckId,
    #[error("truck identifier cannot contain control characters (got {0:?})")]
    InvalidTruckId(String),
}

/// A truck identifier must be non-blank and free of control characters, so
/// each exported record stays on one line.
pub fn validate_truck_id(truck_id: &str) -> std::result::Result<(), ConfigError> {
    if truck_id.trim().is_empty() {
        return Err(ConfigError::EmptyTruckId);
    }
    if truck_id.chars().any(char::is_control) {
        return Err(ConfigError::InvalidTruckId(truck_id.to_owned()));
    }
    Ok(())
}

/// Primary configuration object for a LoadAlert session host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "LOADALERT_CONFIG";

    /// Load configuration from disk, respecting the `LOADALERT_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        let loaded = Self::load_with_source(candidates)?;
        if loaded.source.is_none() {
            return Err(anyhow!(
                "no configuration files found. inspected: {}",
                candidates
                    .iter()
                    .map(|p| p.as_ref().display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        Ok(loaded.config)
    }

    /// Load configuration together with the effective source path.
    ///
    /// Falls back to [`AppConfig::default`] (with `source == None`) when neither the
    /// environment override nor any candidate exists.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(LoadedAppConfig {
            config: AppConfig::default(),
            source: None,
        })
    }

    /// Read and validate a configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<AppConfig>()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.simulator.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Operator-facing simulator settings.
///
/// `start_lat`/`start_lon` are accepted as-is; no range check is applied to
/// coordinates. `stream_interval` is informational only and never paces the core.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_truck_id")]
    pub truck_id: String,
    #[serde(default = "default_threshold")]
    pub threshold_t: f64,
    #[serde(default = "default_noise_pct")]
    pub noise_pct: f64,
    #[serde(default = "default_points_per_rerun")]
    pub points_per_rerun: usize,
    #[serde(default = "default_start_lat")]
    pub start_lat: f64,
    #[serde(default = "default_start_lon")]
    pub start_lon: f64,
    #[serde(default = "default_stream_interval")]
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub stream_interval: Duration,
    #[serde(default)]
    pub auto_stream: bool,
    #[serde(default = "default_initial_baseline")]
    pub initial_baseline_t: f64,
    #[serde(default = "default_burst_probability")]
    pub burst_probability: f64,
    #[serde(default = "default_window_len")]
    pub window_len: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            truck_id: default_truck_id(),
            threshold_t: default_threshold(),
            noise_pct: default_noise_pct(),
            points_per_rerun: default_points_per_rerun(),
            start_lat: default_start_lat(),
            start_lon: default_start_lon(),
            stream_interval: default_stream_interval(),
            auto_stream: false,
            initial_baseline_t: default_initial_baseline(),
            burst_probability: default_burst_probability(),
            window_len: default_window_len(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        // Written as negated comparisons so NaN is rejected as well.
        if !(self.threshold_t > 0.0) || !self.threshold_t.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.threshold_t));
        }
        if !(0.0..=MAX_NOISE_PCT).contains(&self.noise_pct) {
            return Err(ConfigError::InvalidNoise(self.noise_pct));
        }
        if self.points_per_rerun < 1 {
            return Err(ConfigError::InvalidBatchSize(self.points_per_rerun));
        }
        if !(0.0..=1.0).contains(&self.burst_probability) {
            return Err(ConfigError::InvalidBurstProbability(
                self.burst_probability,
            ));
        }
        if self.window_len < 1 {
            return Err(ConfigError::InvalidWindow(self.window_len));
        }
        validate_truck_id(&self.truck_id)
    }

    /// Validate and clamp the batch size into `1..=MAX_POINTS_PER_RERUN`.
    pub fn normalized(mut self) -> std::result::Result<Self, ConfigError> {
        self.validate()?;
        if self.points_per_rerun > MAX_POINTS_PER_RERUN {
            warn!(
                requested = self.points_per_rerun,
                limit = MAX_POINTS_PER_RERUN,
                "points per rerun clamped"
            );
            self.points_per_rerun = MAX_POINTS_PER_RERUN;
        }
        Ok(self)
    }

    /// File name offered when the session log is downloaded.
    pub fn export_file_name(&self) -> String {
        format!("{}_log.csv", self.truck_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    #[serde(default)]
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            file_output: false,
        }
    }
}
