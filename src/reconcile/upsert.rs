//! Creates the batches a request references but the store does not have yet

use super::keys::LookupKeys;
use super::models::{Batch, NewBatch, ResolvedRow};
use crate::api::{Returning, Store, Write};
use anyhow::{Context, bail};
use log::{debug, warn};
use std::collections::HashMap;

/// Result of one gap-fill call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapFill {
    /// Nothing was missing; no request was made
    Nothing,
    Created(usize),
    /// Another writer created some of the batches first
    Conflict(usize),
}

impl GapFill {
    pub fn attempted(&self) -> usize {
        match self {
            GapFill::Nothing => 0,
            GapFill::Created(n) | GapFill::Conflict(n) => *n,
        }
    }
}

/// One creation payload per batch key missing from `existing`, in first-seen
/// order. The owner's SKU and the earliest date across all rows sharing the
/// key are used.
pub fn missing_batches(
    keys: &LookupKeys,
    rows: &[ResolvedRow],
    existing: &HashMap<String, Batch>,
) -> Vec<NewBatch> {
    keys.batch_numbers
        .iter()
        .filter(|key| !existing.contains_key(*key))
        .filter_map(|key| {
            let owner = keys.batch_owner.get(key)?;
            let resolved = rows.get(owner.position)?;
            let date_in = keys
                .earliest_date
                .get(key)
                .cloned()
                .unwrap_or_else(|| resolved.row.date_in.clone());
            Some(NewBatch {
                batch_no: key.clone(),
                sku_id: resolved.sku_id.clone(),
                date_in,
            })
        })
        .collect()
}

/// Submit all missing batches in one merge-on-conflict upsert keyed by
/// `batch_no`. A unique violation is benign; anything else is an error.
pub async fn upsert_batches(store: &dyn Store, table: &str, batches: &[NewBatch]) -> anyhow::Result<GapFill> {
    if batches.is_empty() {
        return Ok(GapFill::Nothing);
    }

    let rows = batches
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .context("failed to serialize batch payload")?;

    let write = Write::insert(table, rows)
        .on_conflict("batch_no")
        .merge_duplicates()
        .returning(Returning::Minimal);

    debug!("Upserting {} batches into {}", batches.len(), table);
    let result = store.write(&write).await.with_context(|| format!("upsert into {}", table))?;

    if result.is_success() {
        return Ok(GapFill::Created(batches.len()));
    }

    if result.is_conflict() {
        warn!(
            "Batch upsert into {} hit a unique violation (concurrent writer); re-reading",
            table
        );
        return Ok(GapFill::Conflict(batches.len()));
    }

    bail!(
        "upsert into {} returned {}: {}",
        table,
        result.status_code.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()),
        result.error.unwrap_or_default()
    )
}
