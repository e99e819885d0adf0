//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Batched streaming generation with chained continuity."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use loadalert_common::{ConfigError, MAX_POINTS_PER_RERUN};
use tracing::debug;

use crate::error::Result;
use crate::generator::{generate, GeneratorParams};
use crate::log::TelemetryLog;
use crate::point::{SimulationState, TelemetryPoint};
use crate::source::TelemetrySource;

/// A fully generated batch that has not been applied yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub points: Vec<TelemetryPoint>,
    pub state: SimulationState,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn overloads(&self) -> usize {
        self.points.iter().filter(|point| point.alert()).count()
    }

    /// Apply the batch: continuity is replaced once, then every point is
    /// appended in generation order. Returns the number of points appended.
    pub fn commit(self, state: &mut SimulationState, log: &mut TelemetryLog) -> usize {
        let appended = self.points.len();
        *state = self.state;
        log.append_batch(self.points);
        appended
    }
}

/// Generate `count` chained points starting from `state`.
///
/// `count` must lie in `1..=MAX_POINTS_PER_RERUN`.
///
/// Each point's output weight and position seed the next one. The caller's state
/// is untouched; the continuity after the last point is returned in the batch.
pub fn advance<S>(
    state: &SimulationState,
    params: &GeneratorParams,
    count: usize,
    source: &mut S,
) -> Result<Batch>
where
    S: TelemetrySource + ?Sized,
{
    if !(1..=MAX_POINTS_PER_RERUN).contains(&count) {
        return Err(ConfigError::InvalidBatchSize(count).into());
    }
    let mut cursor = *state;
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let generated = generate(&cursor, params, source);
        cursor = generated.next;
        points.push(generated.point);
    }
    debug!(
        truck = %params.truck_id,
        count,
        baseline_t = cursor.baseline_weight_t,
        "batch generated"
    );
    Ok(Batch {
        points,
        state: cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::source::FixedSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(noise_pct: f64) -> GeneratorParams {
        GeneratorParams::new("KA01AB1234", noise_pct, 10.0).unwrap()
    }

    #[test]
    fn quiet_batch_holds_baseline() {
        let state = SimulationState::new(5.0, 12.9716, 77.5946);
        let batch = advance(&state, &params(0.0), 3, &mut FixedSource::quiet()).unwrap();
        assert_eq!(batch.len(), 3);
        for point in &batch.points {
            assert_eq!(point.weight_t(), 5.0);
            assert!(!point.alert());
        }
        assert_eq!(batch.state.baseline_weight_t, 5.0);
        assert_eq!(batch.overloads(), 0);
    }

    #[test]
    fn zero_count_is_rejected() {
        let state = SimulationState::new(5.0, 0.0, 0.0);
        let err = advance(&state, &params(1.0), 0, &mut FixedSource::quiet()).unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(ConfigError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn oversize_count_is_rejected_before_allocating() {
        let state = SimulationState::new(5.0, 0.0, 0.0);
        for count in [MAX_POINTS_PER_RERUN + 1, usize::MAX] {
            let err = advance(&state, &params(1.0), count, &mut FixedSource::quiet()).unwrap_err();
            assert!(matches!(
                err,
                SimError::Config(ConfigError::InvalidBatchSize(n)) if n == count
            ));
        }
        let full = advance(&state, &params(1.0), MAX_POINTS_PER_RERUN, &mut FixedSource::quiet());
        assert_eq!(full.map(|batch| batch.len()).ok(), Some(MAX_POINTS_PER_RERUN));
    }

    #[test]
    fn chaining_feeds_previous_output_forward() {
        // fraction 1.0 with 10% noise: every point is 1.1x its predecessor.
        let state = SimulationState::new(1.0, 0.0, 0.0);
        let batch = advance(&state, &params(10.0), 3, &mut FixedSource::new(1.0, false)).unwrap();
        let weights: Vec<f64> = batch.points.iter().map(|p| p.weight_t()).collect();
        assert_eq!(weights, vec![1.1, 1.21, 1.331]);
        let lats: Vec<f64> = batch.points.iter().map(|p| p.lat()).collect();
        assert_eq!(lats, vec![0.0005, 0.001, 0.0015]);
        assert_eq!(batch.state, SimulationState::new(1.331, 0.0015, 0.0015));
    }

    #[test]
    fn seeded_batch_matches_manual_chain() {
        let state = SimulationState::new(8.0, 12.9716, 77.5946);
        let params = params(3.0);
        let batch = advance(&state, &params, 6, &mut StdRng::seed_from_u64(5)).unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        let mut cursor = state;
        for point in &batch.points {
            let generated = generate(&cursor, &params, &mut rng);
            assert_eq!(generated.point.weight_t(), point.weight_t());
            assert_eq!(generated.point.lat(), point.lat());
            cursor = generated.next;
        }
        assert_eq!(cursor, batch.state);
    }

    #[test]
    fn commit_updates_state_then_appends_in_order() {
        let mut state = SimulationState::new(2.0, 0.0, 0.0);
        let mut log = TelemetryLog::new();
        let batch = advance(&state, &params(10.0), 4, &mut FixedSource::new(1.0, false)).unwrap();
        let expected: Vec<f64> = batch.points.iter().map(|p| p.weight_t()).collect();
        let final_state = batch.state;

        assert_eq!(batch.commit(&mut state, &mut log), 4);
        assert_eq!(state, final_state);
        let logged: Vec<f64> = log.iter().map(|p| p.weight_t()).collect();
        assert_eq!(logged, expected);
    }
}
