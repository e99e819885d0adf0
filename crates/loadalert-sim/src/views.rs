//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Read-only views derived from the telemetry log."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Views borrow the log and are rebuilt on every read; none of them holds state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::log::TelemetryLog;
use crate::point::TelemetryPoint;

/// Points shown on the position map by default.
pub const DEFAULT_WINDOW: usize = 30;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsView<'a> {
    pub latest: Option<&'a TelemetryPoint>,
    pub total: usize,
    pub overloads: usize,
}

impl<'a> MetricsView<'a> {
    pub fn from_log(log: &'a TelemetryLog) -> Self {
        Self {
            latest: log.latest(),
            total: log.count(),
            overloads: log.overload_count(),
        }
    }
}

/// Marker styling derived only from a point's alert flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    Normal,
    Overload,
}

impl MarkerStyle {
    pub fn for_point(point: &TelemetryPoint) -> Self {
        if point.alert() {
            MarkerStyle::Overload
        } else {
            MarkerStyle::Normal
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MarkerStyle::Normal => "blue",
            MarkerStyle::Overload => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowMarker<'a> {
    pub point: &'a TelemetryPoint,
    pub style: MarkerStyle,
}

/// The trailing window of the log, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowView<'a> {
    pub markers: Vec<WindowMarker<'a>>,
}

impl<'a> WindowView<'a> {
    pub fn from_log(log: &'a TelemetryLog, len: usize) -> Self {
        let markers = log
            .tail(len)
            .iter()
            .map(|point| WindowMarker {
                point,
                style: MarkerStyle::for_point(point),
            })
            .collect();
        Self { markers }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Named pin on the map: the start position or the latest reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapAnchor {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

/// Everything a map widget needs: centre, trailing markers and an anchor pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView<'a> {
    pub center: (f64, f64),
    pub window: WindowView<'a>,
    pub anchor: MapAnchor,
}

impl<'a> MapView<'a> {
    /// Centre on the latest point, or on the configured start when the log is empty.
    pub fn from_log(
        log: &'a TelemetryLog,
        truck_id: &str,
        start: (f64, f64),
        len: usize,
    ) -> Self {
        match log.latest() {
            Some(latest) => Self {
                center: (latest.lat(), latest.lon()),
                window: WindowView::from_log(log, len),
                anchor: MapAnchor {
                    lat: latest.lat(),
                    lon: latest.lon(),
                    label: format!("{} latest", truck_id),
                },
            },
            None => Self {
                center: start,
                window: WindowView { markers: Vec::new() },
                anchor: MapAnchor {
                    lat: start.0,
                    lon: start.1,
                    label: format!("{} (start)", truck_id),
                },
            },
        }
    }
}

/// Banner describing the latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusView {
    Empty,
    Normal { weight_t: f64 },
    Overload { weight_t: f64, threshold_t: f64 },
}

impl StatusView {
    /// Classification comes from the point itself; `threshold_t` only feeds the message.
    pub fn from_log(log: &TelemetryLog, threshold_t: f64) -> Self {
        match log.latest() {
            None => StatusView::Empty,
            Some(point) if point.alert() => StatusView::Overload {
                weight_t: point.weight_t(),
                threshold_t,
            },
            Some(point) => StatusView::Normal {
                weight_t: point.weight_t(),
            },
        }
    }

    pub fn is_overload(&self) -> bool {
        matches!(self, StatusView::Overload { .. })
    }

    pub fn message(&self) -> String {
        match self {
            StatusView::Empty => {
                "No telemetry yet. Send a manual point or enable auto stream.".to_owned()
            }
            StatusView::Normal { .. } => "Normal: below threshold".to_owned(),
            StatusView::Overload { threshold_t, .. } => {
                format!("OVERLOAD detected! Weight > {:.2} tons", threshold_t)
            }
        }
    }
}

/// Weight history for charting, with the threshold line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSeries {
    pub samples: Vec<(DateTime<Utc>, f64)>,
    pub threshold_t: f64,
}

impl WeightSeries {
    pub fn from_log(log: &TelemetryLog, threshold_t: f64) -> Self {
        Self {
            samples: log
                .iter()
                .map(|point| (point.timestamp(), point.weight_t()))
                .collect(),
            threshold_t,
        }
    }

    pub fn peak(&self) -> Option<f64> {
        self.samples.iter().map(|(_, weight)| *weight).reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::PointOrigin;

    fn log_with(weights: &[f64]) -> TelemetryLog {
        let mut log = TelemetryLog::new();
        for (idx, weight) in weights.iter().enumerate() {
            log.append(TelemetryPoint::classified(
                Utc::now(),
                "KA01AB1234",
                *weight,
                12.0 + idx as f64 * 0.001,
                77.0,
                10.0,
                PointOrigin::Stream,
            ));
        }
        log
    }

    #[test]
    fn metrics_reflect_log() {
        let log = log_with(&[8.0, 12.0, 9.0, 15.0, 10.0]);
        let metrics = MetricsView::from_log(&log);
        assert_eq!(metrics.total, 5);
        assert_eq!(metrics.overloads, 2);
        assert_eq!(metrics.latest.map(|p| p.weight_t()), Some(10.0));
        let empty = TelemetryLog::new();
        assert!(MetricsView::from_log(&empty).latest.is_none());
    }

    #[test]
    fn window_styles_follow_alert_flag() {
        let log = log_with(&[12.0, 3.0]);
        let window = WindowView::from_log(&log, DEFAULT_WINDOW);
        let styles: Vec<_> = window.markers.iter().map(|m| m.style).collect();
        assert_eq!(styles, vec![MarkerStyle::Overload, MarkerStyle::Normal]);
        assert_eq!(window.markers[0].style.color(), "red");
        assert_eq!(window.markers[1].style.color(), "blue");
    }

    #[test]
    fn window_is_bounded_and_ends_at_latest() {
        let weights: Vec<f64> = (0..45).map(f64::from).collect();
        let log = log_with(&weights);
        let window = WindowView::from_log(&log, DEFAULT_WINDOW);
        assert_eq!(window.len(), 30);
        assert_eq!(window.markers[0].point.weight_t(), 15.0);
        assert_eq!(window.markers[29].point.weight_t(), 44.0);
    }

    #[test]
    fn empty_map_centres_on_start() {
        let log = TelemetryLog::new();
        let map = MapView::from_log(&log, "KA01AB1234", (12.9716, 77.5946), DEFAULT_WINDOW);
        assert_eq!(map.center, (12.9716, 77.5946));
        assert!(map.window.is_empty());
        assert_eq!(map.anchor.label, "KA01AB1234 (start)");
    }

    #[test]
    fn populated_map_centres_on_latest() {
        let log = log_with(&[5.0, 6.0, 7.0]);
        let map = MapView::from_log(&log, "KA01AB1234", (0.0, 0.0), 2);
        let latest = log.latest().unwrap();
        assert_eq!(map.center, (latest.lat(), latest.lon()));
        assert_eq!(latest.weight_t(), 7.0);
        assert_eq!(map.window.len(), 2);
        assert_eq!(map.anchor.label, "KA01AB1234 latest");
    }

    #[test]
    fn status_messages() {
        let empty = TelemetryLog::new();
        assert_eq!(StatusView::from_log(&empty, 10.0), StatusView::Empty);

        let overloaded = log_with(&[12.0]);
        let status = StatusView::from_log(&overloaded, 10.0);
        assert!(status.is_overload());
        assert_eq!(status.message(), "OVERLOAD detected! Weight > 10.00 tons");

        let normal = log_with(&[4.0]);
        assert_eq!(
            StatusView::from_log(&normal, 10.0).message(),
            "Normal: below threshold"
        );
    }

    #[test]
    fn status_keeps_creation_time_classification() {
        // Point logged as normal under 10 t stays normal when the threshold drops.
        let log = log_with(&[8.0]);
        assert!(!StatusView::from_log(&log, 5.0).is_overload());
    }

    #[test]
    fn weight_series_tracks_log() {
        let log = log_with(&[5.0, 11.5, 7.0]);
        let series = WeightSeries::from_log(&log, 10.0);
        assert_eq!(series.samples.len(), 3);
        assert_eq!(series.peak(), Some(11.5));
        assert_eq!(series.threshold_t, 10.0);
    }
}
