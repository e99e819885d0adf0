//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Error types surfaced by the simulation core."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use loadalert_common::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

/// Local validation and export failures. None of these invalidate the session.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("exported log is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Whether the error is a rejected setting rather than an export failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, SimError::Config(_))
    }
}
