//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "01-bootstrap"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulation runtime module exports and shared types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Load telemetry simulation core for LoadAlert.
//!
//! The crate generates plausible weight/position readings for a single truck,
//! classifies them against an overload threshold, and keeps an append-only
//! session log with derived views and CSV export. All randomness flows through
//! [`TelemetrySource`] so streams can be replayed deterministically.

pub mod alert;
pub mod error;
pub mod export;
pub mod generator;
pub mod log;
pub mod manual;
pub mod point;
pub mod session;
pub mod source;
pub mod stream;
pub mod views;

pub use alert::classify;
pub use error::{Result, SimError};
pub use export::{export_csv, export_json, write_csv, EXPORT_COLUMNS};
pub use generator::{generate, Generated, GeneratorParams};
pub use log::TelemetryLog;
pub use manual::{submit, ManualReading};
pub use point::{PointOrigin, SimulationState, TelemetryPoint};
pub use session::{BatchReport, Session};
pub use source::{FixedSource, TelemetrySource};
pub use stream::{advance, Batch};
pub use views::{
    MapAnchor, MapView, MarkerStyle, MetricsView, StatusView, WeightSeries, WindowMarker,
    WindowView, DEFAULT_WINDOW,
};
