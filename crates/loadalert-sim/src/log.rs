//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Append-only telemetry log with running counters."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use crate::point::TelemetryPoint;

/// Chronological, append-only history of readings.
///
/// Points are never reordered or deduplicated. The overload counter is kept in
/// step with every append so aggregate reads never rescan the log.
#[derive(Debug, Clone, Default)]
pub struct TelemetryLog {
    points: Vec<TelemetryPoint>,
    overloads: usize,
}

impl TelemetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, point: TelemetryPoint) {
        if point.alert() {
            self.overloads += 1;
        }
        self.points.push(point);
    }

    /// Equivalent to appending each point in iteration order.
    pub fn append_batch<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = TelemetryPoint>,
    {
        let points = points.into_iter();
        self.points.reserve(points.size_hint().0);
        for point in points {
            self.append(point);
        }
    }

    /// Drop every point and reset the counters.
    pub fn clear(&mut self) {
        self.points.clear();
        self.overloads = 0;
    }

    /// The last `min(n, len)` points, oldest first.
    pub fn tail(&self, n: usize) -> &[TelemetryPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn overload_count(&self) -> usize {
        self.overloads
    }

    pub fn latest(&self) -> Option<&TelemetryPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TelemetryPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[TelemetryPoint] {
        &self.points
    }
}

impl<'a> IntoIterator for &'a TelemetryLog {
    type Item = &'a TelemetryPoint;
    type IntoIter = std::slice::Iter<'a, TelemetryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
