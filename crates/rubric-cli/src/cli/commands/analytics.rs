use crate::cli::args::AnalyticsArgs;
use crate::cli::context::build_engine;
use crate::exit_codes;
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use rubric_core::model::{AnalyticsWindow, Granularity};
use rubric_core::report::{console, json};
use std::path::Path;

fn parse_ts(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("'{}' is not an RFC 3339 timestamp", raw))
}

fn window_from(args: &AnalyticsArgs) -> anyhow::Result<AnalyticsWindow> {
    let end = match &args.to {
        Some(raw) => parse_ts(raw)?,
        None => Utc::now(),
    };
    let start = match &args.from {
        Some(raw) => parse_ts(raw)?,
        None => end - chrono::Duration::days(30),
    };
    let granularity: Granularity = args
        .granularity
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    Ok(AnalyticsWindow::new(start, end, granularity))
}

pub fn run(config: &Path, as_json: bool, args: AnalyticsArgs) -> anyhow::Result<i32> {
    let (engine, _cfg) = build_engine(config)?;
    let window = window_from(&args)?;

    match engine.quality_analytics(&window) {
        Ok(report) => {
            if as_json {
                json::to_stdout(&report)?;
            } else {
                console::print_analytics(&report);
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => {
            eprintln!("analytics failed: {}", err);
            Ok(exit_codes::for_error(&err))
        }
    }
}

pub fn recommend(config: &Path, as_json: bool) -> anyhow::Result<i32> {
    let (engine, _cfg) = build_engine(config)?;

    match engine.improvement_recommendations() {
        Ok(report) => {
            if as_json {
                json::to_stdout(&report)?;
            } else {
                console::print_recommendations(&report);
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => {
            eprintln!("recommendations failed: {}", err);
            Ok(exit_codes::for_error(&err))
        }
    }
}
