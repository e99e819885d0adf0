//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Noisy weight and position point generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use loadalert_common::config::MAX_NOISE_PCT;
use loadalert_common::{validate_truck_id, ConfigError, SimulatorConfig};

use crate::point::{round_to, PointOrigin, SimulationState, TelemetryPoint};
use crate::point::{COORD_DECIMALS, WEIGHT_DECIMALS};
use crate::source::TelemetrySource;

/// Maximum per-axis position drift per point, in degrees.
pub const POSITION_JITTER_DEG: f64 = 0.0005;
/// Default probability of a sudden load/unload event per point.
pub const BURST_PROBABILITY: f64 = 0.08;
/// Burst magnitude as a fraction of the input baseline.
pub const BURST_SPAN: f64 = 0.6;

/// Per-point generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    pub truck_id: String,
    pub noise_pct: f64,
    pub threshold_t: f64,
    pub burst_probability: f64,
}

impl GeneratorParams {
    pub fn new(
        truck_id: impl Into<String>,
        noise_pct: f64,
        threshold_t: f64,
    ) -> Result<Self, ConfigError> {
        let truck_id = truck_id.into();
        validate_truck_id(&truck_id)?;
        if !(threshold_t > 0.0) || !threshold_t.is_finite() {
            return Err(ConfigError::InvalidThreshold(threshold_t));
        }
        if !(0.0..=MAX_NOISE_PCT).contains(&noise_pct) {
            return Err(ConfigError::InvalidNoise(noise_pct));
        }
        Ok(Self {
            truck_id,
            noise_pct,
            threshold_t,
            burst_probability: BURST_PROBABILITY,
        })
    }

    /// Override the burst probability; `0.0` suppresses bursts entirely.
    pub fn with_burst_probability(mut self, probability: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::InvalidBurstProbability(probability));
        }
        self.burst_probability = probability;
        Ok(self)
    }

    pub fn from_config(config: &SimulatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            truck_id: config.truck_id.clone(),
            noise_pct: config.noise_pct,
            threshold_t: config.threshold_t,
            burst_probability: config.burst_probability,
        })
    }
}

/// A generated point together with the continuity it leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub point: TelemetryPoint,
    pub next: SimulationState,
}

/// Produce one simulated reading from `state`, stamped with the current time.
pub fn generate<S>(state: &SimulationState, params: &GeneratorParams, source: &mut S) -> Generated
where
    S: TelemetrySource + ?Sized,
{
    generate_at(Utc::now(), state, params, source)
}

/// Same as [`generate`] with an explicit timestamp.
///
/// Draw order is fixed (lat, lon, noise, burst roll, burst delta) so a seeded
/// source always replays the same stream.
pub fn generate_at<S>(
    timestamp: DateTime<Utc>,
    state: &SimulationState,
    params: &GeneratorParams,
    source: &mut S,
) -> Generated
where
    S: TelemetrySource + ?Sized,
{
    let lat = round_to(
        state.lat + source.uniform(-POSITION_JITTER_DEG, POSITION_JITTER_DEG),
        COORD_DECIMALS,
    );
    let lon = round_to(
        state.lon + source.uniform(-POSITION_JITTER_DEG, POSITION_JITTER_DEG),
        COORD_DECIMALS,
    );

    let baseline = state.baseline_weight_t;
    let spread = params.noise_pct / 100.0;
    let factor = 1.0 + source.uniform(-spread, spread);
    let mut weight = (baseline * factor).max(0.0);

    if source.chance(params.burst_probability) {
        // an unbounded baseline has no meaningful burst
        let span = (BURST_SPAN * baseline).abs();
        if span.is_finite() {
            weight = (weight + source.uniform(-span, span)).max(0.0);
        }
    }
    let weight = round_to(weight, WEIGHT_DECIMALS);

    let point = TelemetryPoint::classified(
        timestamp,
        &params.truck_id,
        weight,
        lat,
        lon,
        params.threshold_t,
        PointOrigin::Stream,
    );
    Generated {
        point,
        next: SimulationState::new(weight, lat, lon),
    }
}
