//! Insert payload: resolved rows joined with their batch

use super::keys::batch_key;
use super::models::{Batch, InventoryPayloadItem, ResolvedRow, SkippedRow};
use std::collections::{HashMap, HashSet};

pub const BATCH_NOT_RESOLVED: &str = "Batch not resolved";
pub const DUPLICATE_IN_REQUEST: &str = "Duplicate barcode in request";

/// Attach batch ids and build insertable records. Rows whose batch is still
/// unknown, and repeats of a barcode already seen in this request, are
/// skipped.
pub fn build_payload(
    rows: &[ResolvedRow],
    batches: &HashMap<String, Batch>,
) -> (Vec<InventoryPayloadItem>, Vec<SkippedRow>) {
    let mut items = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    let mut seen_barcodes = HashSet::with_capacity(rows.len());

    for resolved in rows {
        let Some(batch) = batches.get(&batch_key(&resolved.row.batch_no)) else {
            skipped.push(SkippedRow::new(
                resolved.row.clone(),
                format!("{}: {}", BATCH_NOT_RESOLVED, resolved.row.batch_no),
            ));
            continue;
        };

        if !seen_barcodes.insert(resolved.row.barcode.as_str()) {
            skipped.push(SkippedRow::new(resolved.row.clone(), DUPLICATE_IN_REQUEST));
            continue;
        }

        items.push(InventoryPayloadItem::from_resolved(resolved, batch));
    }

    (items, skipped)
}
