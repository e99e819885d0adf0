//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Operator-supplied manual readings."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::GeneratorParams;
use crate::log::TelemetryLog;
use crate::point::{round_to, PointOrigin, SimulationState, TelemetryPoint};
use crate::point::{COORD_DECIMALS, WEIGHT_DECIMALS};

/// A reading entered by an operator. Values are trusted as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualReading {
    pub weight_t: f64,
    pub lat: f64,
    pub lon: f64,
}

impl ManualReading {
    pub fn new(weight_t: f64, lat: f64, lon: f64) -> Self {
        Self { weight_t, lat, lon }
    }

    /// Prefill from the current continuity, as the manual form shows it.
    pub fn from_state(state: &SimulationState) -> Self {
        Self::new(state.baseline_weight_t, state.lat, state.lon)
    }
}

/// Classify and append `reading`, then make it the new continuity baseline.
///
/// The logged point is rounded like generated points; continuity takes the
/// submitted values unrounded. No noise or burst model applies.
pub fn submit(
    log: &mut TelemetryLog,
    state: &mut SimulationState,
    params: &GeneratorParams,
    reading: ManualReading,
) -> TelemetryPoint {
    let point = TelemetryPoint::classified(
        Utc::now(),
        &params.truck_id,
        round_to(reading.weight_t, WEIGHT_DECIMALS),
        round_to(reading.lat, COORD_DECIMALS),
        round_to(reading.lon, COORD_DECIMALS),
        params.threshold_t,
        PointOrigin::Manual,
    );
    *state = SimulationState::new(reading.weight_t, reading.lat, reading.lon);
    debug!(
        truck = %params.truck_id,
        weight_t = point.weight_t(),
        alert = point.alert(),
        "manual point submitted"
    );
    log.append(point.clone());
    point
}
