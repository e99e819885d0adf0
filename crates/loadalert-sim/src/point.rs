//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Telemetry point and continuity state types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use loadalert_common::SimulatorConfig;
use serde::{Deserialize, Serialize};

use crate::alert::classify;

/// Decimal places kept for weights (tons).
pub const WEIGHT_DECIMALS: i32 = 3;
/// Decimal places kept for coordinates (degrees).
pub const COORD_DECIMALS: i32 = 6;

/// Round to `decimals` places. Values too large to scale are returned as given.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// Where a logged reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointOrigin {
    Stream,
    Manual,
}

impl PointOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointOrigin::Stream => "stream",
            PointOrigin::Manual => "manual",
        }
    }
}

/// One load/position reading. Immutable once created; `alert` always reflects the
/// threshold in force when the point was built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryPoint {
    timestamp: DateTime<Utc>,
    truck_id: String,
    weight_t: f64,
    lat: f64,
    lon: f64,
    alert: bool,
    origin: PointOrigin,
}

impl TelemetryPoint {
    /// Build a point and classify it. Negative weights are clamped to zero.
    pub fn classified(
        timestamp: DateTime<Utc>,
        truck_id: &str,
        weight_t: f64,
        lat: f64,
        lon: f64,
        threshold_t: f64,
        origin: PointOrigin,
    ) -> Self {
        let weight_t = weight_t.max(0.0);
        Self {
            timestamp,
            truck_id: truck_id.to_owned(),
            weight_t,
            lat,
            lon,
            alert: classify(weight_t, threshold_t),
            origin,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn truck_id(&self) -> &str {
        &self.truck_id
    }

    pub fn weight_t(&self) -> f64 {
        self.weight_t
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn alert(&self) -> bool {
        self.alert
    }

    pub fn origin(&self) -> PointOrigin {
        self.origin
    }
}

/// Carry-forward values seeding the next generated point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub baseline_weight_t: f64,
    pub lat: f64,
    pub lon: f64,
}

impl SimulationState {
    pub fn new(baseline_weight_t: f64, lat: f64, lon: f64) -> Self {
        Self {
            baseline_weight_t,
            lat,
            lon,
        }
    }

    /// Session-start continuity: configured start position and initial baseline.
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(config.initial_baseline_t, config.start_lat, config.start_lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_keeps_requested_precision() {
        assert_eq!(round_to(8.123_456, WEIGHT_DECIMALS), 8.123);
        assert_eq!(round_to(12.971_600_4, COORD_DECIMALS), 12.9716);
        assert_eq!(round_to(-0.000_000_4, COORD_DECIMALS), 0.0);
    }

    #[test]
    fn rounding_leaves_huge_and_infinite_values_alone() {
        assert_eq!(round_to(1.7e308, WEIGHT_DECIMALS), 1.7e308);
        assert_eq!(round_to(f64::INFINITY, WEIGHT_DECIMALS), f64::INFINITY);
        assert!(round_to(f64::NAN, COORD_DECIMALS).is_nan());
    }

    #[test]
    fn classified_point_clamps_and_flags() {
        let now = Utc::now();
        let point =
            TelemetryPoint::classified(now, "truck", -3.0, 1.0, 2.0, 10.0, PointOrigin::Manual);
        assert_eq!(point.weight_t(), 0.0);
        assert!(!point.alert());

        let heavy =
            TelemetryPoint::classified(now, "truck", 10.5, 1.0, 2.0, 10.0, PointOrigin::Stream);
        assert!(heavy.alert());
        assert_eq!(heavy.origin(), PointOrigin::Stream);
        assert_eq!(heavy.truck_id(), "truck");
    }

    #[test]
    fn state_seeds_from_config() {
        let config = SimulatorConfig::default();
        let state = SimulationState::from_config(&config);
        assert_eq!(state.baseline_weight_t, 8.0);
        assert_eq!(state.lat, 12.9716);
        assert_eq!(state.lon, 77.5946);
    }
}
