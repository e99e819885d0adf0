//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Structured logging adapters for simulator sessions."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Context-enriched logging helpers shared by the simulator core and CLI.

use tracing::Level;

pub mod macros;

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Truck identifier the event refers to.
    pub truck: Option<&'a str>,
    /// Sequence number of the host invocation (rerun).
    pub rerun: Option<u64>,
    /// Origin of the telemetry (stream, manual, etc.).
    pub mode: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a truck identifier.
    pub fn with_truck(mut self, truck: &'a str) -> Self {
        self.truck = Some(truck);
        self
    }

    /// Attach a rerun sequence number.
    pub fn with_rerun(mut self, rerun: u64) -> Self {
        self.rerun = Some(rerun);
        self
    }

    /// Attach a telemetry origin descriptor.
    pub fn with_mode(mut self, mode: &'a str) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// High-level outcome used when emitting session lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation was rejected or failed.
    Fault,
}

impl SessionEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SessionEventOutcome::Success => "success",
            SessionEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized session event with a success/fault outcome.
pub fn log_session_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SessionEventOutcome,
) {
    let default_ctx = LogContext::default();
    let ctx = context.unwrap_or(&default_ctx);
    match outcome {
        SessionEventOutcome::Success => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            truck = ctx.truck.unwrap_or(""),
            rerun = ctx.rerun.unwrap_or_default(),
            mode = ctx.mode.unwrap_or(""),
            message = %message
        ),
        SessionEventOutcome::Fault => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            truck = ctx.truck.unwrap_or(""),
            rerun = ctx.rerun.unwrap_or_default(),
            mode = ctx.mode.unwrap_or(""),
            message = %message
        ),
    }
}
