//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Operator CLI driving simulation sessions."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Line-oriented session host. Each input line is one invocation; a failing
//! command is reported and the session carries on.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use loadalert_common::SimulatorConfig;
use loadalert_sim::{Session, TelemetrySource};
use tracing::warn;

use crate::render;

const HELP: &str = "\
commands:
  stream [N]          generate N points (default: points per rerun)
  rerun               one invocation; streams only when auto_stream is on
  manual W [LAT LON]  submit a reading (position defaults to current)
  status              latest reading, totals and alert banner
  tail [N]            last N points (default 10)
  map                 trailing window markers
  history [N]         last N weights against the threshold (default 20)
  clear               empty the log, keep position and baseline
  reset               empty the log and restart from the configured start
  export [FILE|DIR]   write CSV (default: <truck>_log.csv), stdout if omitted
  set KEY VALUE       change a setting (truck_id, threshold, noise, points,
                      auto_stream, interval, start_lat, start_lon, window)
  help                this text
  quit                leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Stream(Option<usize>),
    Rerun,
    Manual {
        weight_t: f64,
        position: Option<(f64, f64)>,
    },
    Status,
    Tail(usize),
    Map,
    History(usize),
    Clear,
    Reset,
    Export(Option<PathBuf>),
    Set {
        key: String,
        value: String,
    },
    Help,
    Quit,
}

fn parse_number<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| anyhow!("{} must be a number, got '{}'", what, raw))
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((head, rest)) = words.split_first() else {
            bail!("empty command");
        };
        let command = match (head.to_ascii_lowercase().as_str(), rest) {
            ("stream", []) => ShellCommand::Stream(None),
            ("stream", [count]) => ShellCommand::Stream(Some(parse_number(count, "count")?)),
            ("rerun", []) => ShellCommand::Rerun,
            ("manual", [weight]) => ShellCommand::Manual {
                weight_t: parse_number(weight, "weight")?,
                position: None,
            },
            ("manual", [weight, lat, lon]) => ShellCommand::Manual {
                weight_t: parse_number(weight, "weight")?,
                position: Some((
                    parse_number(lat, "latitude")?,
                    parse_number(lon, "longitude")?,
                )),
            },
            ("status", []) => ShellCommand::Status,
            ("tail", []) => ShellCommand::Tail(10),
            ("tail", [count]) => ShellCommand::Tail(parse_number(count, "count")?),
            ("map", []) => ShellCommand::Map,
            ("history", []) => ShellCommand::History(20),
            ("history", [count]) => ShellCommand::History(parse_number(count, "count")?),
            ("clear", []) => ShellCommand::Clear,
            ("reset", []) => ShellCommand::Reset,
            ("export", []) => ShellCommand::Export(None),
            ("export", [path]) => ShellCommand::Export(Some(PathBuf::from(path))),
            ("set", [key, value]) => ShellCommand::Set {
                key: (*key).to_owned(),
                value: (*value).to_owned(),
            },
            ("help" | "?", []) => ShellCommand::Help,
            ("quit" | "exit", []) => ShellCommand::Quit,
            (other, _) => bail!("unrecognised command '{}' (try 'help')", other),
        };
        Ok(command)
    }
}

/// Apply `KEY VALUE` to a copy of the settings.
pub fn apply_setting(config: &mut SimulatorConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "truck_id" | "truck" => config.truck_id = value.to_owned(),
        "threshold" | "threshold_t" => config.threshold_t = parse_number(value, key)?,
        "noise" | "noise_pct" => config.noise_pct = parse_number(value, key)?,
        "points" | "points_per_rerun" => config.points_per_rerun = parse_number(value, key)?,
        "auto_stream" => {
            config.auto_stream = match value {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                other => bail!("auto_stream expects on/off, got '{}'", other),
            }
        }
        "interval" | "stream_interval" => {
            let secs: f64 = parse_number(value, key)?;
            config.stream_interval = Duration::try_from_secs_f64(secs)
                .map_err(|_| anyhow!("interval must be a non-negative number of seconds"))?;
        }
        "start_lat" => config.start_lat = parse_number(value, key)?,
        "start_lon" => config.start_lon = parse_number(value, key)?,
        "window" | "window_len" => config.window_len = parse_number(value, key)?,
        other => bail!("unknown setting '{}'", other),
    }
    Ok(())
}

/// Outcome of one shell line.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn execute<S, W>(session: &mut Session<S>, command: ShellCommand, out: &mut W) -> Result<Flow>
where
    S: TelemetrySource,
    W: Write,
{
    match command {
        ShellCommand::Stream(count) => {
            let count = count.unwrap_or(session.config().points_per_rerun);
            let report = session.generate_batch_of(count)?;
            for point in session.log().tail(report.appended) {
                writeln!(out, "{}", render::point_line(point))?;
            }
            writeln!(
                out,
                "appended {} simulated points (advisory interval {:.1}s)",
                report.appended,
                report.advisory_interval.as_secs_f64()
            )?;
        }
        ShellCommand::Rerun => match session.rerun()? {
            Some(report) => writeln!(out, "appended {} simulated points", report.appended)?,
            None => writeln!(out, "auto stream is off; nothing appended")?,
        },
        ShellCommand::Manual { weight_t, position } => {
            let draft = session.manual_draft();
            let (lat, lon) = position.unwrap_or((draft.lat, draft.lon));
            let point = session.submit_manual(weight_t, lat, lon);
            writeln!(out, "{}", render::point_line(&point))?;
        }
        ShellCommand::Status => {
            writeln!(
                out,
                "{}",
                render::metrics(&session.metrics(), &session.status())
            )?;
        }
        ShellCommand::Tail(count) => {
            for point in session.log().tail(count) {
                writeln!(out, "{}", render::point_line(point))?;
            }
        }
        ShellCommand::Map => writeln!(out, "{}", render::map(&session.map()))?,
        ShellCommand::History(count) => writeln!(
            out,
            "{}",
            render::history(&session.weight_series(), count)
        )?,
        ShellCommand::Clear => {
            session.clear();
            writeln!(out, "log cleared")?;
        }
        ShellCommand::Reset => {
            session.reset();
            writeln!(out, "session reset to configured start")?;
        }
        ShellCommand::Export(None) => write!(out, "{}", session.export_csv()?)?,
        ShellCommand::Export(Some(path)) => {
            let written = session.export_to_path(&path)?;
            writeln!(
                out,
                "exported {} points -> {}",
                session.log().count(),
                written.display()
            )?;
        }
        ShellCommand::Set { key, value } => {
            let mut config = session.config().clone();
            apply_setting(&mut config, &key, &value)?;
            session.update_config(config)?;
            writeln!(out, "{} = {}", key, value)?;
        }
        ShellCommand::Help => writeln!(out, "{}", HELP)?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Drive a session from `input` until EOF or `quit`.
pub fn run_session<S, R, W>(session: &mut Session<S>, input: R, out: &mut W) -> Result<()>
where
    S: TelemetrySource,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line.context("failed to read command")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let outcome = trimmed
            .parse::<ShellCommand>()
            .and_then(|command| execute(session, command, out));
        match outcome {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => {
                warn!(command = %trimmed, error = %err, "command rejected");
                writeln!(out, "error: {:#}", err)?;
            }
        }
        out.flush()?;
    }
    Ok(())
}

pub fn run_stdin(config: SimulatorConfig) -> Result<()> {
    let mut session = Session::from_config(config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(
        stdout,
        "LoadAlert shell for {} (type 'help')",
        session.config().truck_id
    )?;
    run_session(&mut session, stdin.lock(), &mut stdout)
}
