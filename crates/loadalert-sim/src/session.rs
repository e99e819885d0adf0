//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Session facade threading continuity, log and randomness."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use loadalert_common::SimulatorConfig;
use loadalert_logging::{
    la_debug, la_info, la_warn, log_session_event, LogContext, SessionEventOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::error::{Result, SimError};
use crate::export;
use crate::generator::GeneratorParams;
use crate::log::TelemetryLog;
use crate::manual::{self, ManualReading};
use crate::point::{SimulationState, TelemetryPoint};
use crate::source::TelemetrySource;
use crate::stream;
use crate::views::{MapView, MetricsView, StatusView, WeightSeries, WindowView};

/// Summary returned after a streaming invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchReport {
    pub appended: usize,
    pub overloads: usize,
    /// Advisory pacing hint echoed from the configuration; never enforced.
    pub advisory_interval: Duration,
}

/// One simulated truck: settings, continuity, log and the randomness source.
///
/// Every operation runs to completion before returning. Hosts that share a
/// session across threads must serialise access themselves.
#[derive(Debug)]
pub struct Session<S = StdRng> {
    config: SimulatorConfig,
    params: GeneratorParams,
    state: SimulationState,
    log: TelemetryLog,
    source: S,
    reruns: u64,
}

impl Session<StdRng> {
    /// Seed from `config.seed`, or from OS entropy when unset.
    pub fn from_config(config: SimulatorConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_source(config, rng)
    }
}

impl<S: TelemetrySource> Session<S> {
    pub fn with_source(config: SimulatorConfig, source: S) -> Result<Self> {
        let config = config.normalized()?;
        let params = GeneratorParams::from_config(&config)?;
        let state = SimulationState::from_config(&config);
        info!(
            truck = %config.truck_id,
            threshold_t = config.threshold_t,
            start_lat = config.start_lat,
            start_lon = config.start_lon,
            "simulation session started"
        );
        Ok(Self {
            config,
            params,
            state,
            log: TelemetryLog::new(),
            source,
            reruns: 0,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn log(&self) -> &TelemetryLog {
        &self.log
    }

    /// Number of invocations that mutated the session so far.
    pub fn reruns(&self) -> u64 {
        self.reruns
    }

    fn context(&self) -> LogContext<'_> {
        LogContext::new()
            .with_truck(&self.config.truck_id)
            .with_rerun(self.reruns)
    }

    /// Swap settings between invocations.
    ///
    /// Only points created afterwards see the new threshold, noise or truck id.
    /// The carried position is kept even if the start coordinates changed.
    /// A rejected config leaves the session untouched.
    pub fn update_config(&mut self, config: SimulatorConfig) -> Result<()> {
        let config = match config.normalized() {
            Ok(config) => config,
            Err(err) => {
                log_session_event(
                    Some(&self.context()),
                    "session.config",
                    &err.to_string(),
                    SessionEventOutcome::Fault,
                );
                return Err(err.into());
            }
        };
        self.params = GeneratorParams::from_config(&config)?;
        self.config = config;
        la_info!(
            context = self.context().with_mode("config"),
            "settings updated (threshold {:.2} t, noise {}%, {} points per rerun)",
            self.config.threshold_t,
            self.config.noise_pct,
            self.config.points_per_rerun
        );
        Ok(())
    }

    /// Generate `points_per_rerun` points and apply them.
    pub fn generate_batch(&mut self) -> Result<BatchReport> {
        self.generate_batch_of(self.config.points_per_rerun)
    }

    /// Generate `count` chained points and apply them.
    ///
    /// The batch is built in full before continuity or log change, so an error
    /// leaves the session exactly as it was.
    pub fn generate_batch_of(&mut self, count: usize) -> Result<BatchReport> {
        let batch = stream::advance(&self.state, &self.params, count, &mut self.source)?;
        let was_overloaded = self.latest_alert();
        let overloads = batch.overloads();
        let appended = batch.commit(&mut self.state, &mut self.log);
        self.reruns += 1;
        la_info!(
            context = self.context().with_mode("stream"),
            "appended {} simulated points ({} overloads, advisory interval {:.1}s)",
            appended,
            overloads,
            self.config.stream_interval.as_secs_f64()
        );
        self.note_overload_transition(was_overloaded);
        Ok(BatchReport {
            appended,
            overloads,
            advisory_interval: self.config.stream_interval,
        })
    }

    /// One host invocation: streams a batch only when auto streaming is on.
    pub fn rerun(&mut self) -> Result<Option<BatchReport>> {
        if !self.config.auto_stream {
            la_debug!(
                context = self.context().with_mode("stream"),
                "auto stream off, rerun appends nothing"
            );
            return Ok(None);
        }
        self.generate_batch().map(Some)
    }

    /// Classify and log an operator reading; it becomes the new continuity.
    pub fn submit_manual(&mut self, weight_t: f64, lat: f64, lon: f64) -> TelemetryPoint {
        let was_overloaded = self.latest_alert();
        let point = manual::submit(
            &mut self.log,
            &mut self.state,
            &self.params,
            ManualReading::new(weight_t, lat, lon),
        );
        self.reruns += 1;
        la_info!(
            context = self.context().with_mode("manual"),
            "manual point {} t at ({}, {})",
            point.weight_t(),
            point.lat(),
            point.lon()
        );
        self.note_overload_transition(was_overloaded);
        point
    }

    /// Values the manual entry form is prefilled with.
    pub fn manual_draft(&self) -> ManualReading {
        ManualReading::from_state(&self.state)
    }

    /// Empty the log. Continuity is kept so the next point carries on smoothly.
    pub fn clear(&mut self) {
        let dropped = self.log.count();
        self.log.clear();
        log_session_event(
            Some(&self.context()),
            "session.clear",
            &format!("log cleared ({} points dropped)", dropped),
            SessionEventOutcome::Success,
        );
    }

    /// Empty the log and reseed continuity from the configured start.
    pub fn reset(&mut self) {
        self.log.clear();
        self.state = SimulationState::from_config(&self.config);
        self.reruns = 0;
        log_session_event(
            Some(&self.context()),
            "session.reset",
            "log cleared and continuity reseeded",
            SessionEventOutcome::Success,
        );
    }

    pub fn metrics(&self) -> MetricsView<'_> {
        MetricsView::from_log(&self.log)
    }

    pub fn window(&self) -> WindowView<'_> {
        WindowView::from_log(&self.log, self.config.window_len)
    }

    pub fn map(&self) -> MapView<'_> {
        MapView::from_log(
            &self.log,
            &self.config.truck_id,
            (self.config.start_lat, self.config.start_lon),
            self.config.window_len,
        )
    }

    pub fn status(&self) -> StatusView {
        StatusView::from_log(&self.log, self.config.threshold_t)
    }

    pub fn weight_series(&self) -> WeightSeries {
        WeightSeries::from_log(&self.log, self.config.threshold_t)
    }

    pub fn export_csv(&self) -> Result<String> {
        export::export_csv(&self.log)
    }

    pub fn export_json(&self) -> Result<String> {
        export::export_json(&self.log)
    }

    /// Write the CSV export. A directory target receives `{truck_id}_log.csv`.
    pub fn export_to_path(&self, target: &Path) -> Result<PathBuf> {
        let path = if target.is_dir() {
            target.join(self.config.export_file_name())
        } else {
            target.to_path_buf()
        };
        let written = fs::File::create(&path)
            .map_err(SimError::from)
            .and_then(|file| export::write_csv(&self.log, file));
        match written {
            Ok(()) => {
                log_session_event(
                    Some(&self.context()),
                    "session.export",
                    &format!("{} points written to {}", self.log.count(), path.display()),
                    SessionEventOutcome::Success,
                );
                Ok(path)
            }
            Err(err) => {
                log_session_event(
                    Some(&self.context()),
                    "session.export",
                    &err.to_string(),
                    SessionEventOutcome::Fault,
                );
                Err(err)
            }
        }
    }

    fn latest_alert(&self) -> bool {
        self.log.latest().is_some_and(|point| point.alert())
    }

    fn note_overload_transition(&self, was_overloaded: bool) {
        if let Some(latest) = self.log.latest() {
            if latest.alert() && !was_overloaded {
                la_warn!(
                    context = self.context(),
                    "overload detected: {} t > {:.2} t",
                    latest.weight_t(),
                    self.config.threshold_t
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FixedSource;
    use loadalert_common::ConfigError;

    fn quiet_session(config: SimulatorConfig) -> Session<FixedSource> {
        Session::with_source(config, FixedSource::quiet()).unwrap()
    }

    #[test]
    fn rejects_invalid_config_at_start() {
        let config = SimulatorConfig {
            threshold_t: 0.0,
            ..SimulatorConfig::default()
        };
        let err = Session::with_source(config, FixedSource::quiet()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn batch_uses_points_per_rerun() {
        let mut session = quiet_session(SimulatorConfig::default());
        let report = session.generate_batch().unwrap();
        assert_eq!(report.appended, 3);
        assert_eq!(session.log().count(), 3);
        assert_eq!(session.reruns(), 1);
        assert_eq!(report.advisory_interval, Duration::from_secs(1));
    }

    #[test]
    fn failed_batch_leaves_session_untouched() {
        let mut session = quiet_session(SimulatorConfig::default());
        let before = *session.state();
        let err = session.generate_batch_of(0).unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(ConfigError::InvalidBatchSize(0))
        ));
        assert_eq!(*session.state(), before);
        assert!(session.log().is_empty());

        let err = session.generate_batch_of(500).unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(ConfigError::InvalidBatchSize(500))
        ));
        assert!(session.log().is_empty());
        assert_eq!(session.reruns(), 0);
    }

    #[test]
    fn rerun_respects_auto_stream() {
        let mut session = quiet_session(SimulatorConfig::default());
        assert_eq!(session.rerun().unwrap(), None);
        assert!(session.log().is_empty());

        let mut config = session.config().clone();
        config.auto_stream = true;
        session.update_config(config).unwrap();
        let report = session.rerun().unwrap().expect("auto stream batch");
        assert_eq!(report.appended, 3);
    }

    #[test]
    fn clear_keeps_continuity_and_reset_reseeds() {
        let mut session = quiet_session(SimulatorConfig::default());
        session.submit_manual(12.0, 13.0, 78.0);
        session.clear();
        assert_eq!(session.log().count(), 0);
        assert_eq!(session.log().overload_count(), 0);
        assert_eq!(session.state().baseline_weight_t, 12.0);

        session.reset();
        assert_eq!(
            *session.state(),
            SimulationState::from_config(session.config())
        );
        assert_eq!(session.reruns(), 0);
    }

    #[test]
    fn threshold_change_only_affects_new_points() {
        let mut session = quiet_session(SimulatorConfig::default());
        session.submit_manual(9.0, 0.0, 0.0);
        let mut config = session.config().clone();
        config.threshold_t = 5.0;
        session.update_config(config).unwrap();
        session.submit_manual(9.0, 0.0, 0.0);

        let alerts: Vec<bool> = session.log().iter().map(|p| p.alert()).collect();
        assert_eq!(alerts, vec![false, true]);
        assert_eq!(session.log().overload_count(), 1);
    }

    #[test]
    fn start_change_does_not_move_carried_position() {
        let mut session = quiet_session(SimulatorConfig::default());
        let mut config = session.config().clone();
        config.start_lat = 40.0;
        config.start_lon = -74.0;
        session.update_config(config).unwrap();
        assert_eq!(session.state().lat, 12.9716);
        assert_eq!(session.state().lon, 77.5946);
    }

    #[test]
    fn rejected_update_keeps_previous_settings() {
        let mut session = quiet_session(SimulatorConfig::default());
        let mut config = session.config().clone();
        config.noise_pct = 150.0;
        assert!(session.update_config(config).is_err());
        assert_eq!(session.config().noise_pct, 1.0);
    }

    #[test]
    fn manual_draft_tracks_continuity() {
        let mut session = quiet_session(SimulatorConfig::default());
        assert_eq!(session.manual_draft().weight_t, 8.0);
        session.submit_manual(6.5, 1.0, 2.0);
        assert_eq!(session.manual_draft(), ManualReading::new(6.5, 1.0, 2.0));
    }

    #[test]
    fn status_and_map_follow_latest_point() {
        let mut session = quiet_session(SimulatorConfig::default());
        assert_eq!(session.status(), StatusView::Empty);
        assert_eq!(session.map().anchor.label, "KA01AB1234 (start)");

        session.submit_manual(11.0, 12.5, 77.5);
        assert!(session.status().is_overload());
        let map = session.map();
        assert_eq!(map.center, (12.5, 77.5));
        assert_eq!(map.window.markers[0].style.color(), "red");
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let config = SimulatorConfig {
            seed: Some(1234),
            noise_pct: 5.0,
            ..SimulatorConfig::default()
        };
        let mut a = Session::from_config(config.clone()).unwrap();
        let mut b = Session::from_config(config).unwrap();
        for _ in 0..5 {
            a.generate_batch().unwrap();
            b.generate_batch().unwrap();
        }
        let left: Vec<f64> = a.log().iter().map(|p| p.weight_t()).collect();
        let right: Vec<f64> = b.log().iter().map(|p| p.weight_t()).collect();
        assert_eq!(left, right);
        assert_eq!(a.state(), b.state());
    }
}
