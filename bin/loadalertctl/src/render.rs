//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Operator CLI driving simulation sessions."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Plain-text rendering of session views for the terminal.

use loadalert_sim::{MapView, MetricsView, StatusView, TelemetryPoint, WeightSeries};

pub fn point_line(point: &TelemetryPoint) -> String {
    format!(
        "{}  {:<12} {:>9.3} t  ({:.6}, {:.6})  {}",
        point.timestamp().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        point.truck_id(),
        point.weight_t(),
        point.lat(),
        point.lon(),
        if point.alert() { "OVERLOAD" } else { "ok" }
    )
}

pub fn metrics(metrics: &MetricsView<'_>, status: &StatusView) -> String {
    let mut lines = Vec::new();
    if let Some(latest) = metrics.latest {
        lines.push("Latest telemetry".to_owned());
        lines.push(format!("  weight (tons): {}", latest.weight_t()));
        lines.push(format!("  location:      {}, {}", latest.lat(), latest.lon()));
        lines.push(format!(
            "  total points:  {} (overloads: {})",
            metrics.total, metrics.overloads
        ));
    }
    lines.push(status.message());
    lines.join("\n")
}

pub fn map(map: &MapView<'_>) -> String {
    let mut lines = vec![format!(
        "map centre ({:.6}, {:.6}), {} marker(s)",
        map.center.0,
        map.center.1,
        map.window.len()
    )];
    lines.extend(map.window.markers.iter().map(|marker| {
        format!(
            "  [{:<4}] {:.6}, {:.6}  {} | {}t",
            marker.style.color(),
            marker.point.lat(),
            marker.point.lon(),
            marker.point.timestamp().to_rfc3339(),
            marker.point.weight_t()
        )
    }));
    lines.push(format!(
        "  pin: {} at ({:.6}, {:.6})",
        map.anchor.label, map.anchor.lat, map.anchor.lon
    ));
    lines.join("\n")
}

/// Last `n` weight samples as a bar chart against the threshold line.
pub fn history(series: &WeightSeries, n: usize) -> String {
    const WIDTH: f64 = 40.0;
    let Some(peak) = series.peak() else {
        return "no weight history yet".to_owned();
    };
    let scale = peak.max(series.threshold_t);
    let start = series.samples.len().saturating_sub(n);
    let mut lines = vec![format!(
        "weight history: {} sample(s), peak {} t, threshold {:.2} t",
        series.samples.len(),
        peak,
        series.threshold_t
    )];
    lines.extend(series.samples[start..].iter().map(|(timestamp, weight)| {
        let filled = if scale.is_finite() && scale > 0.0 {
            ((weight / scale) * WIDTH).round().clamp(0.0, WIDTH) as usize
        } else {
            0
        };
        let marker = if *weight > series.threshold_t { '!' } else { ' ' };
        format!(
            "  {} {:>9.3} {}{}",
            timestamp.format("%H:%M:%S"),
            weight,
            "#".repeat(filled),
            marker
        )
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadalert_common::SimulatorConfig;
    use loadalert_sim::{FixedSource, Session};

    #[test]
    fn empty_session_renders_hint_and_start_pin() {
        let session =
            Session::with_source(SimulatorConfig::default(), FixedSource::quiet()).unwrap();
        let text = metrics(&session.metrics(), &session.status());
        assert!(text.starts_with("No telemetry yet"));
        let map_text = map(&session.map());
        assert!(map_text.contains("0 marker(s)"));
        assert!(map_text.contains("KA01AB1234 (start)"));
    }

    #[test]
    fn overload_renders_banner_and_red_marker() {
        let mut session =
            Session::with_source(SimulatorConfig::default(), FixedSource::quiet()).unwrap();
        let point = session.submit_manual(12.0, 12.9716, 77.5946);
        assert!(point_line(&point).ends_with("OVERLOAD"));
        let text = metrics(&session.metrics(), &session.status());
        assert!(text.contains("total points:  1 (overloads: 1)"));
        assert!(text.ends_with("OVERLOAD detected! Weight > 10.00 tons"));
        assert!(map(&session.map()).contains("[red ]"));
    }

    #[test]
    fn history_scales_bars_and_flags_overloads() {
        let mut session =
            Session::with_source(SimulatorConfig::default(), FixedSource::quiet()).unwrap();
        assert_eq!(history(&session.weight_series(), 10), "no weight history yet");

        session.submit_manual(5.0, 12.9716, 77.5946);
        session.submit_manual(20.0, 12.9716, 77.5946);
        let text = history(&session.weight_series(), 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("2 sample(s), peak 20 t, threshold 10.00 t"));
        assert_eq!(lines[1].matches('#').count(), 10);
        assert!(!lines[1].ends_with('!'));
        assert_eq!(lines[2].matches('#').count(), 40);
        assert!(lines[2].ends_with('!'));

        let trimmed = history(&session.weight_series(), 1);
        assert_eq!(trimmed.lines().count(), 2);
    }
}
