//! Report entry point for the Giseki engine.
//!
//! Reads outcome records from a JSON file, normalises them into seat events,
//! and prints one JSON document holding the normalisation summary, the
//! per-year snapshots, and the party timeline.
//!
//! ```text
//! records.json --> normalize --> seat events --+--> yearly snapshots
//!                                              +--> party timeline
//! ```

mod error;
mod settings;

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use giseki_core::{
    EngineConfig, LogFormat, NormalizeReport, build_party_timeline, build_snapshots,
    normalize_records,
};
use giseki_types::{OutcomeRecord, PartyTimeline, SnapshotReport};

use crate::settings::ReportSettings;

/// Everything the binary prints.
#[derive(Debug, Serialize)]
struct Report {
    /// How the records were filtered.
    normalize: NormalizeReport,
    /// Per-year, per-scope snapshots.
    snapshots: SnapshotReport,
    /// Running seat totals.
    timeline: PartyTimeline,
}

/// Application entry point.
///
/// Loads settings and configuration, initializes logging, runs both
/// aggregation drivers, and writes the report to stdout.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or if a driver
/// fails.
fn main() -> anyhow::Result<()> {
    let settings = ReportSettings::from_env()?;
    let config = match &settings.config_path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::parse("")?,
    };

    init_logging(&config);
    info!(
        records = %settings.records_path.display(),
        now = %settings.now,
        nominal_years = config.terms.nominal_years,
        regions = config.gazetteer.len(),
        "giseki-report starting"
    );

    let records = load_records(&settings.records_path)?;
    let resolver = config.resolver();
    let normalized = normalize_records(&records, &resolver, &config.normalize_options());
    info!(
        seen = normalized.report.seen,
        kept = normalized.report.kept,
        events = normalized.report.events,
        "records normalized"
    );

    let snapshots = build_snapshots(&normalized.events, &config.snapshot_options())?;
    let timeline =
        build_party_timeline(&normalized.events, &config.timeline_options(settings.now))?;
    info!(
        years = snapshots.years.len(),
        points = timeline.dates.len(),
        parties = timeline.parties.len(),
        "aggregation complete"
    );

    let report = Report {
        normalize: normalized.report,
        snapshots,
        timeline,
    };
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Read a JSON array of outcome records.
fn load_records(path: &Path) -> anyhow::Result<Vec<OutcomeRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading records from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing records from {}", path.display()))
}
