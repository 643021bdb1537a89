//! Run inventory reports over a JSON snapshot.
//!
//! ```text
//! warehouse-reports <snapshot.json> [report-name | all]
//! ```
//!
//! The snapshot file holds `{"deliveries": [...], "issuances": [...]}`. Report
//! runs are printed to stdout as JSON; logs go to stderr.

use std::fs;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};

use warehouse_analytics::{ReportCatalog, ReportConfig, ReportKind};
use warehouse_core::{Clock, FixedClock, SystemClock};
use warehouse_inventory::{InMemoryRecordStore, RecordStore, Snapshot};

fn main() -> anyhow::Result<()> {
    warehouse_observability::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: warehouse-reports <snapshot.json> [report-name | all]");
    };
    let selection = args.next().unwrap_or_else(|| "all".to_string());

    let raw = fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let snapshot: Snapshot =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse snapshot {path}"))?;
    let store = InMemoryRecordStore::from_snapshot(snapshot);

    let config = ReportConfig::from_env();
    config.validate().context("invalid report configuration")?;

    match std::env::var("WAREHOUSE_NOW") {
        Ok(raw_now) => {
            let now = DateTime::parse_from_rfc3339(&raw_now)
                .with_context(|| format!("WAREHOUSE_NOW is not RFC 3339: {raw_now}"))?
                .with_timezone(&Utc);
            tracing::info!(%now, "using pinned clock");
            run(ReportCatalog::with_clock(config, FixedClock::new(now)), &store, &selection)
        }
        Err(_) => run(ReportCatalog::with_clock(config, SystemClock), &store, &selection),
    }
}

fn run<C: Clock>(
    catalog: ReportCatalog<C>,
    store: &impl RecordStore,
    selection: &str,
) -> anyhow::Result<()> {
    let snapshot = store.snapshot();
    tracing::info!(
        deliveries = snapshot.deliveries.len(),
        issuances = snapshot.issuances.len(),
        selection,
        "running reports"
    );

    let runs = if selection == "all" {
        catalog.run_all(&snapshot)?
    } else {
        let kind: ReportKind = selection.parse()?;
        vec![catalog.run(kind, &snapshot)?]
    };

    let out = serde_json::to_string_pretty(&runs).context("failed to encode report output")?;
    println!("{out}");
    Ok(())
}
