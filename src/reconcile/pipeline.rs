//! The import pipeline: normalize, resolve, gap-fill, build, insert, report

use super::error::{Phase, PipelineError};
use super::insert::{ChunkedInserter, InsertOutcome};
use super::keys::{LookupKeys, brand_key};
use super::models::{EntityId, RawRow, ResolvedRow, SkippedRow};
use super::normalize::normalize_rows;
use super::payload::build_payload;
use super::report::{ImportReport, ReportBuilder};
use super::resolver::BatchedResolver;
use super::upsert::{GapFill, missing_batches, upsert_batches};
use crate::api::Store;
use crate::config::{PipelineSettings, TableNames};
use log::{error, info};
use std::collections::HashSet;

pub struct Reconciler<'a> {
    store: &'a dyn Store,
    settings: &'a PipelineSettings,
    tables: &'a TableNames,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn Store, settings: &'a PipelineSettings, tables: &'a TableNames) -> Self {
        Self { store, settings, tables }
    }

    /// Run one import. Row-level problems end up in `skippedRows`; a phase
    /// failure ends the run and is reported alongside the counters so far.
    pub async fn run(&self, rows: &[RawRow]) -> ImportReport {
        let mut report = ReportBuilder::new(self.settings.skipped_rows_cap, self.settings.reason_max_len);

        match self.execute(rows, &mut report).await {
            Ok(()) => {
                let report = report.finish();
                info!(
                    "Import finished: {} inserted, {} duplicates, {} skipped",
                    report.inserted, report.duplicates_skipped, report.skipped
                );
                report
            }
            Err(err) => {
                error!("Import aborted: {}", err);
                report.fail(err)
            }
        }
    }

    async fn execute(&self, raw_rows: &[RawRow], report: &mut ReportBuilder) -> Result<(), PipelineError> {
        let (rows, invalid) = normalize_rows(raw_rows, self.settings.date_order);
        info!("Normalized {} rows ({} missing required fields)", raw_rows.len(), invalid.len());
        report.extend(invalid);
        report.note(format!("normalized {} rows", raw_rows.len()));

        if rows.is_empty() {
            return Ok(());
        }

        let resolver = BatchedResolver::new(self.store, self.tables, self.settings.lookup_chunk_size);
        let keys = LookupKeys::collect(&rows);

        // Brands
        let brands = resolver
            .resolve_brands(&keys.brand_names)
            .await
            .map_err(|e| Phase::ResolveBrands.fail(e))?;
        info!("Resolved {}/{} brands", brands.len(), keys.brand_names.len());

        let mut branded = Vec::with_capacity(rows.len());
        for row in rows {
            match brands.get(&brand_key(&row.brand_name)) {
                Some(brand) => branded.push((row, brand.id.clone())),
                None => {
                    let reason = format!("Brand not found: {}", row.brand_name);
                    report.skip(SkippedRow::new(row, reason));
                }
            }
        }

        // SKUs are scoped to their brand
        let mut seen_pairs = HashSet::new();
        let sku_pairs: Vec<(EntityId, String)> = branded
            .iter()
            .map(|(row, brand_id)| (brand_id.clone(), row.sku_code.clone()))
            .filter(|pair| seen_pairs.insert(pair.clone()))
            .collect();

        let skus = if sku_pairs.is_empty() {
            Default::default()
        } else {
            resolver
                .resolve_skus(&sku_pairs)
                .await
                .map_err(|e| Phase::ResolveSkus.fail(e))?
        };
        info!("Resolved {}/{} skus", skus.len(), sku_pairs.len());
        report.note(format!("resolved {} brands, {} skus", brands.len(), skus.len()));

        let mut resolved = Vec::with_capacity(branded.len());
        for (row, brand_id) in branded {
            match skus.get(&(brand_id.clone(), row.sku_code.clone())) {
                Some(sku) => resolved.push(ResolvedRow {
                    sku_id: sku.id.clone(),
                    brand_id,
                    row,
                }),
                None => {
                    let reason = format!("SKU not found: {} / {}", row.brand_name, row.sku_code);
                    report.skip(SkippedRow::new(row, reason));
                }
            }
        }

        if resolved.is_empty() {
            return Ok(());
        }

        // Batches are global; missing ones are created once per key
        let batch_keys = LookupKeys::collect(resolved.iter().map(|r| &r.row));
        let mut batches = resolver
            .resolve_batches(&batch_keys.batch_spellings)
            .await
            .map_err(|e| Phase::ResolveBatches.fail(e))?;
        info!("Resolved {}/{} batches", batches.len(), batch_keys.batch_numbers.len());

        let missing = missing_batches(&batch_keys, &resolved, &batches);
        let fill = upsert_batches(self.store, &self.tables.batches, &missing)
            .await
            .map_err(|e| Phase::UpsertBatches.fail(e))?;

        match fill {
            GapFill::Nothing => {}
            GapFill::Created(n) => report.note(format!("created {} batches", n)),
            GapFill::Conflict(n) => report.note(format!("upserted {} batches (conflict tolerated)", n)),
        }

        if fill.attempted() > 0 {
            let missing_keys: Vec<String> = missing.into_iter().map(|b| b.batch_no).collect();
            let refetched = resolver
                .resolve_batches(&missing_keys)
                .await
                .map_err(|e| Phase::RefetchBatches.fail(e))?;
            info!("Re-read {}/{} new batches", refetched.len(), missing_keys.len());
            batches.extend(refetched);
        }

        // Inventory
        let (items, unbuildable) = build_payload(&resolved, &batches);
        report.extend(unbuildable);

        let inserter = ChunkedInserter::new(
            self.store,
            &self.tables.inventory,
            self.settings.insert_chunk_size,
            self.settings.duplicate_accounting,
        );
        let mut outcome = InsertOutcome::default();
        let result = inserter.insert(&items, &mut outcome).await;

        info!(
            "Inserted {} of {} rows in {} chunks ({} duplicates)",
            outcome.inserted,
            items.len(),
            outcome.chunks,
            outcome.duplicates
        );
        report.note(format!("inserted {} in {} chunks", outcome.inserted, outcome.chunks));
        report.record_inserts(outcome);

        result.map_err(|e| Phase::InsertInventory.fail(e))
    }
}
