//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Operator CLI driving simulation sessions."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use loadalert_common::SimulatorConfig;
use loadalert_sim::{Session, TelemetrySource};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// A manual reading given as `WEIGHT` or `WEIGHT,LAT,LON`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualSpec {
    pub weight_t: f64,
    pub position: Option<(f64, f64)>,
}

impl FromStr for ManualSpec {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        let number = |raw: &str| {
            raw.parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", raw))
        };
        match parts.as_slice() {
            [weight] => Ok(Self {
                weight_t: number(*weight)?,
                position: None,
            }),
            [weight, lat, lon] => Ok(Self {
                weight_t: number(*weight)?,
                position: Some((number(*lat)?, number(*lon)?)),
            }),
            _ => Err(format!(
                "expected WEIGHT or WEIGHT,LAT,LON but got '{}'",
                input
            )),
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Number of streaming reruns to execute
    #[arg(long, default_value_t = 1)]
    pub reruns: u32,

    /// Manual reading submitted before streaming (repeatable)
    #[arg(long = "manual", value_name = "W[,LAT,LON]", allow_hyphen_values = true)]
    pub manual: Vec<ManualSpec>,

    /// Export destination: a file, a directory, or '-' for stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Explicit output format when the extension is ambiguous
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Print every appended point
    #[arg(long)]
    pub verbose: bool,
}

pub fn determine_format(path: &Path, override_format: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = override_format {
        return format;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Csv,
    }
}

pub fn run(config: SimulatorConfig, args: RunArgs) -> Result<()> {
    let mut session = Session::from_config(config)?;
    execute(&mut session, &args)?;
    eprintln!(
        "{}",
        render::metrics(&session.metrics(), &session.status())
    );
    if let Some(output) = &args.output {
        write_output(&session, output, args.format)?;
    }
    Ok(())
}

/// Apply the scripted invocations: manual readings first, then the reruns.
pub fn execute<S: TelemetrySource>(session: &mut Session<S>, args: &RunArgs) -> Result<()> {
    for spec in &args.manual {
        let draft = session.manual_draft();
        let (lat, lon) = spec.position.unwrap_or((draft.lat, draft.lon));
        let point = session.submit_manual(spec.weight_t, lat, lon);
        if args.verbose {
            eprintln!("{}", render::point_line(&point));
        }
    }
    for _ in 0..args.reruns {
        let report = session.generate_batch()?;
        if args.verbose {
            for point in session.log().tail(report.appended) {
                eprintln!("{}", render::point_line(point));
            }
        }
    }
    Ok(())
}

fn write_output<S: TelemetrySource>(
    session: &Session<S>,
    output: &Path,
    format: Option<OutputFormat>,
) -> Result<()> {
    if output.as_os_str() == "-" {
        let rendered = match format.unwrap_or(OutputFormat::Csv) {
            OutputFormat::Csv => session.export_csv()?,
            OutputFormat::Json => session.export_json()?,
        };
        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        return Ok(());
    }

    let written = match determine_format(output, format) {
        OutputFormat::Csv => session.export_to_path(output)?,
        OutputFormat::Json => {
            if output.is_dir() {
                return Err(anyhow!(
                    "json export needs a file path, got directory {}",
                    output.display()
                ));
            }
            std::fs::write(output, session.export_json()?)
                .with_context(|| format!("failed to write {}", output.display()))?;
            output.to_path_buf()
        }
    };
    eprintln!(
        "exported {} points for {} -> {}",
        session.log().count(),
        session.config().truck_id,
        written.display()
    );
    Ok(())
}
