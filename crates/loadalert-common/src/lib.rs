//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the simulator runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the LoadAlert workspace.
//! This crate exposes configuration loading, validation, and tracing
//! initialisation consumed by the simulator core and the operator CLI.

pub mod config;
pub mod logging;

pub use config::{
    validate_truck_id, AppConfig, ConfigError, LoadedAppConfig, LoggingConfig, SimulatorConfig,
    MAX_POINTS_PER_RERUN,
};
pub use logging::{init_tracing, LogFormat};
