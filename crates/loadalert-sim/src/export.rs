//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Flat-file export of the session log."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::io::Write;

use chrono::SecondsFormat;
use csv::WriterBuilder;
use serde::Serialize;

use crate::error::Result;
use crate::log::TelemetryLog;
use crate::point::TelemetryPoint;

/// Export columns, in order.
pub const EXPORT_COLUMNS: [&str; 6] = ["timestamp", "truck_id", "weight_t", "lat", "lon", "alert"];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    timestamp: String,
    truck_id: &'a str,
    weight_t: f64,
    lat: f64,
    lon: f64,
    alert: bool,
}

impl<'a> From<&'a TelemetryPoint> for ExportRow<'a> {
    fn from(point: &'a TelemetryPoint) -> Self {
        Self {
            timestamp: point
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            truck_id: point.truck_id(),
            weight_t: point.weight_t(),
            lat: point.lat(),
            lon: point.lon(),
            alert: point.alert(),
        }
    }
}

/// Write the header and one row per point, in log order.
///
/// The header is written explicitly so an empty log still exports one line.
pub fn write_csv<W: Write>(log: &TelemetryLog, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(EXPORT_COLUMNS)?;
    for point in log {
        writer.serialize(ExportRow::from(point))?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the full log as CSV text.
pub fn export_csv(log: &TelemetryLog) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(log, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Render the full log as a pretty-printed JSON array using the export columns.
pub fn export_json(log: &TelemetryLog) -> Result<String> {
    let rows: Vec<ExportRow<'_>> = log.iter().map(ExportRow::from).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
