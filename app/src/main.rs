//! FILENAME: app/src/main.rs
// PURPOSE: `drilldown` binary. Loads the issue export, opens one session and
// answers JSON-lines commands on stdin with JSON lines on stdout.
//
// USAGE:
//   drilldown --data issues.xlsx
//   {"command":"select","chart":"test-type","value":"Regression"}
//   {"command":"clear","chart":"test-type"}
//   {"command":"reset"}
//   {"command":"filters"}
//   {"command":"export","path":"charts.xlsx"}

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use app_lib::logging::{init_logging, log_info, log_warn};
use app_lib::{
    create_app_state, export_session, handle_selection, open_session, reset_session,
    session_filters, AppConfig, AppState, SelectionRequest, SessionId,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "drilldown")]
#[command(about = "Cascading drill-down charts over an issue-tracker export")]
struct Args {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Issue export (.xlsx, .xlsm or .json).
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long)]
    sheet: Option<String>,
    /// Dashboard definition JSON.
    #[arg(long)]
    dashboard: Option<PathBuf>,
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// error, warn, info, debug or trace.
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => AppConfig::default(),
        };
        if self.data.is_some() {
            config.data = self.data;
        }
        if self.sheet.is_some() {
            config.sheet = self.sheet;
        }
        if self.dashboard.is_some() {
            config.dashboard = self.dashboard;
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum Command {
    Select { chart: String, value: String },
    Clear { chart: String },
    Reset,
    Filters,
    Export { path: PathBuf },
}

#[derive(Debug, Serialize)]
struct ErrorLine {
    error: String,
}

fn run_command(state: &AppState, session_id: SessionId, command: Command) -> Result<serde_json::Value> {
    let value = match command {
        Command::Select { chart, value } => serde_json::to_value(handle_selection(
            state,
            &SelectionRequest {
                session_id,
                source_node_id: chart,
                selected_value: Some(value),
            },
        )?)?,
        Command::Clear { chart } => serde_json::to_value(handle_selection(
            state,
            &SelectionRequest {
                session_id,
                source_node_id: chart,
                selected_value: None,
            },
        )?)?,
        Command::Reset => serde_json::to_value(reset_session(state, session_id)?)?,
        Command::Filters => serde_json::to_value(session_filters(state, session_id)?)?,
        Command::Export { path } => {
            let written = export_session(state, session_id, &path)?;
            serde_json::json!({ "exported": written, "path": path })
        }
    };
    Ok(value)
}

fn write_line<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let config = Args::parse().into_config()?;
    init_logging(config.log_level_filter()?, config.log_file.as_deref())?;

    let dataset = config.load_dataset().context("failed to load dataset")?;
    let dashboard = config.load_dashboard().context("failed to load dashboard")?;
    let state = create_app_state(dataset, &dashboard)?;

    let opened = open_session(&state)?;
    let session_id = opened.session_id;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_line(&mut out, &opened)?;

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let result = serde_json::from_str::<Command>(&line)
            .map_err(anyhow::Error::from)
            .and_then(|command| run_command(&state, session_id, command));
        match result {
            Ok(value) => write_line(&mut out, &value)?,
            Err(e) => {
                log_warn!("SESSION", "command failed: {}", e);
                write_line(&mut out, &ErrorLine { error: e.to_string() })?;
            }
        }
    }

    log_info!("SYS", "stdin closed, exiting");
    Ok(())
}
