//! Chunked key → entity resolution against the store
//!
//! Each distinct key set is split into chunks of `chunk_size` and fetched
//! with one set-membership query per chunk, so a request's query string
//! stays bounded no matter how many rows were submitted. Chunk requests run
//! sequentially and a non-success response aborts the lookup.

use super::keys::{batch_key, brand_key};
use super::models::{Batch, Brand, EntityId, Sku};
use crate::api::{Filter, QueryBuilder, Store};
use crate::config::TableNames;
use anyhow::Context;
use log::debug;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};

pub struct BatchedResolver<'a> {
    store: &'a dyn Store,
    tables: &'a TableNames,
    chunk_size: usize,
}

impl<'a> BatchedResolver<'a> {
    pub fn new(store: &'a dyn Store, tables: &'a TableNames, chunk_size: usize) -> Self {
        Self {
            store,
            tables,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Brand name → brand, keyed by [`brand_key`]
    pub async fn resolve_brands(&self, names: &[String]) -> anyhow::Result<HashMap<String, Brand>> {
        let wanted: HashSet<String> = names.iter().map(|n| brand_key(n)).collect();

        let brands: Vec<Brand> = self
            .fetch_chunked(&self.tables.brands, &["id", "name"], names, |chunk| any_ieq("name", chunk))
            .await?;

        let mut resolved = HashMap::with_capacity(brands.len());
        for brand in brands {
            let key = brand_key(&brand.name);
            if wanted.contains(&key) {
                resolved.entry(key).or_insert(brand);
            }
        }
        Ok(resolved)
    }

    /// `(brand_id, sku_code)` → SKU. Matching is exact on both parts.
    pub async fn resolve_skus(&self, pairs: &[(EntityId, String)]) -> anyhow::Result<HashMap<(EntityId, String), Sku>> {
        let wanted: HashSet<&(EntityId, String)> = pairs.iter().collect();

        let skus: Vec<Sku> = self
            .fetch_chunked(&self.tables.skus, &["id", "sku_code", "brand_id"], pairs, |chunk| {
                Filter::or(
                    chunk
                        .iter()
                        .map(|(brand_id, sku_code)| {
                            Filter::and(vec![Filter::eq("brand_id", brand_id), Filter::eq("sku_code", sku_code)])
                        })
                        .collect(),
                )
            })
            .await?;

        let mut resolved = HashMap::with_capacity(skus.len());
        for sku in skus {
            let key = (sku.brand_id.clone(), sku.sku_code.clone());
            if wanted.contains(&key) {
                resolved.entry(key).or_insert(sku);
            }
        }
        Ok(resolved)
    }

    /// Batch number → batch, keyed by [`batch_key`]. Each spelling matches
    /// case-insensitively, so rows stored before keys were normalized
    /// (`lot-7`) are still found for `LOT-7`.
    pub async fn resolve_batches(&self, batch_nos: &[String]) -> anyhow::Result<HashMap<String, Batch>> {
        let batches: Vec<Batch> = self
            .fetch_chunked(&self.tables.batches, &["id", "batch_no", "sku_id", "date_in"], batch_nos, |chunk| {
                any_ieq("batch_no", chunk)
            })
            .await?;

        let wanted: HashSet<String> = batch_nos.iter().map(|b| batch_key(b)).collect();
        let mut resolved = HashMap::with_capacity(batches.len());
        for batch in batches {
            let key = batch_key(&batch.batch_no);
            if wanted.contains(&key) {
                resolved.entry(key).or_insert(batch);
            }
        }
        Ok(resolved)
    }

    /// One select per chunk of `keys`; rows from all chunks are concatenated
    async fn fetch_chunked<K, T, F>(&self, table: &str, select: &[&str], keys: &[K], make_filter: F) -> anyhow::Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&[K]) -> Filter,
    {
        let mut out = Vec::new();
        let total_chunks = keys.len().div_ceil(self.chunk_size);

        for (chunk_idx, chunk) in keys.chunks(self.chunk_size).enumerate() {
            let rows = QueryBuilder::new(table)
                .select(select)
                .filter(make_filter(chunk))
                .execute(self.store)
                .await
                .with_context(|| format!("lookup on {} (chunk {}/{})", table, chunk_idx + 1, total_chunks))?
                .into_rows()
                .with_context(|| format!("lookup on {} (chunk {}/{})", table, chunk_idx + 1, total_chunks))?;

            debug!(
                "{}: chunk {}/{} ({} keys) matched {} rows",
                table,
                chunk_idx + 1,
                total_chunks,
                chunk.len(),
                rows.len()
            );

            for row in rows {
                let entity = serde_json::from_value(row)
                    .with_context(|| format!("unexpected row shape from {}", table))?;
                out.push(entity);
            }
        }

        Ok(out)
    }
}

fn any_ieq(field: &str, values: &[String]) -> Filter {
    let mut matches: Vec<Filter> = values.iter().map(|value| Filter::ieq(field, value)).collect();
    if matches.len() == 1 {
        matches.remove(0)
    } else {
        Filter::or(matches)
    }
}
