//! Chunked ignore-duplicates insert of inventory records

use super::models::{InventoryPayloadItem, SkippedRow};
use crate::api::{Returning, Store, Write};
use crate::config::DuplicateAccounting;
use anyhow::Context;
use log::{debug, warn};
use std::collections::HashSet;

pub const BARCODE_EXISTS: &str = "Barcode already exists";

/// Running totals across insert chunks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: Vec<SkippedRow>,
    /// Chunks that received a response
    pub chunks: usize,
}

pub struct ChunkedInserter<'a> {
    store: &'a dyn Store,
    table: &'a str,
    chunk_size: usize,
    accounting: DuplicateAccounting,
}

impl<'a> ChunkedInserter<'a> {
    pub fn new(store: &'a dyn Store, table: &'a str, chunk_size: usize, accounting: DuplicateAccounting) -> Self {
        Self {
            store,
            table,
            chunk_size: chunk_size.max(1),
            accounting,
        }
    }

    /// Insert `items` chunk by chunk, accumulating into `outcome`.
    ///
    /// A chunk the store rejects skips all of its rows and the next chunk is
    /// tried. A transport failure stops here with `outcome` holding the
    /// totals of the chunks already sent.
    pub async fn insert(&self, items: &[InventoryPayloadItem], outcome: &mut InsertOutcome) -> anyhow::Result<()> {
        let total_chunks = items.len().div_ceil(self.chunk_size);

        for (chunk_idx, chunk) in items.chunks(self.chunk_size).enumerate() {
            let rows = chunk
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()
                .context("failed to serialize inventory payload")?;

            let write = self.build_write(rows);
            let result = self
                .store
                .write(&write)
                .await
                .with_context(|| format!("insert into {} (chunk {}/{})", self.table, chunk_idx + 1, total_chunks))?;
            outcome.chunks += 1;

            if !result.is_success() {
                let reason = result
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("insert failed with status {:?}", result.status_code));
                warn!(
                    "{}: chunk {}/{} rejected ({} rows): {}",
                    self.table,
                    chunk_idx + 1,
                    total_chunks,
                    chunk.len(),
                    reason
                );
                outcome
                    .skipped
                    .extend(chunk.iter().map(|item| SkippedRow::new(item.to_row(), reason.clone())));
                continue;
            }

            match self.accounting {
                DuplicateAccounting::PerRow => {
                    let echoed: HashSet<String> = result.echoed_strings("barcode").into_iter().collect();
                    for item in chunk {
                        if echoed.contains(&item.barcode) {
                            outcome.inserted += 1;
                        } else {
                            outcome.duplicates += 1;
                            outcome.skipped.push(SkippedRow::new(item.to_row(), BARCODE_EXISTS));
                        }
                    }
                }
                DuplicateAccounting::CountOnly => {
                    let inserted = result
                        .affected
                        .map(|n| (n as usize).min(chunk.len()))
                        .unwrap_or(result.rows.len().min(chunk.len()));
                    outcome.inserted += inserted;
                    outcome.duplicates += chunk.len() - inserted;
                }
            }

            debug!(
                "{}: chunk {}/{} done, {} inserted so far",
                self.table,
                chunk_idx + 1,
                total_chunks,
                outcome.inserted
            );
        }

        Ok(())
    }

    fn build_write(&self, rows: Vec<serde_json::Value>) -> Write {
        let write = Write::insert(self.table, rows)
            .on_conflict("barcode")
            .ignore_duplicates();

        match self.accounting {
            DuplicateAccounting::PerRow => write.returning(Returning::Representation).select(&["barcode"]),
            DuplicateAccounting::CountOnly => write.returning(Returning::Minimal).exact_count(),
        }
    }
}
