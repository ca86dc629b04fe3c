use crate::api::StoreClient;
use crate::config::Config;
use crate::reconcile::{ImportReport, Reconciler};
use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Import rows from a JSON file through the same pipeline the server runs.
/// Prints the report as pretty JSON and fails if the import aborted.
pub async fn ingest_command(path: &Path, config_path: Option<&Path>) -> Result<()> {
    info!("Importing rows from {}", path.display());

    let content = fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))?;
    let rows = parse_rows(&content).with_context(|| format!("Invalid import file {}", path.display()))?;
    debug!("Read {} rows", rows.len());

    let config = Config::load(config_path)?;
    let store = StoreClient::new(&config.store)?;

    let report = Reconciler::new(&store, &config.pipeline, &config.tables)
        .run(&rows)
        .await;
    print_report(&report)?;

    if let (Some(error), Some(phase)) = (&report.error, report.phase) {
        bail!("Import failed in {}: {}", phase, error);
    }
    Ok(())
}

/// Accept the HTTP body shape or a bare array
fn parse_rows(content: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(content).context("not valid JSON")?;
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut body) => match body.remove("rows") {
            Some(Value::Array(rows)) => rows,
            _ => bail!("expected a \"rows\" array"),
        },
        _ => bail!("expected an object with \"rows\" or an array"),
    };

    if rows.is_empty() {
        bail!("no rows to import");
    }
    Ok(rows)
}

fn print_report(report: &ImportReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
