//! Distinct lookup keys for a set of rows
//!
//! Every downstream lookup is issued once per distinct key, never per row.

use super::models::NormalizedRow;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Brand names match case-insensitively
pub fn brand_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Batch numbers are global: trimmed, whitespace collapsed, uppercased
pub fn batch_key(batch_no: &str) -> String {
    batch_no.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// The first row seen for a batch key; its SKU owns a newly created batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOwner {
    /// Index into the slice the keys were collected from
    pub position: usize,
    pub brand_name: String,
    pub sku_code: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupKeys {
    /// Distinct by [`brand_key`], first-seen spelling, first-seen order
    pub brand_names: Vec<String>,
    /// Distinct [`batch_key`]s in first-seen order
    pub batch_numbers: Vec<String>,
    /// Every case-insensitively distinct spelling to look batches up by:
    /// each key, then trimmed raw spellings that differ from it
    pub batch_spellings: Vec<String>,
    /// Earliest valid ISO `date_in` per batch key. A raw value is kept only
    /// when no row of the batch carries a valid date.
    pub earliest_date: HashMap<String, String>,
    pub batch_owner: HashMap<String, BatchOwner>,
}

impl LookupKeys {
    pub fn collect<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedRow>,
    {
        let mut keys = LookupKeys::default();
        let mut seen_brands = HashSet::new();
        let mut seen_spellings = HashSet::new();

        for (position, row) in rows.into_iter().enumerate() {
            let brand = brand_key(&row.brand_name);
            if seen_brands.insert(brand.clone()) {
                keys.brand_names.push(row.brand_name.trim().to_string());
            }

            let batch = batch_key(&row.batch_no);
            for spelling in [batch.as_str(), row.batch_no.trim()] {
                if seen_spellings.insert(spelling.to_lowercase()) {
                    keys.batch_spellings.push(spelling.to_string());
                }
            }

            // Valid ISO dates order lexicographically
            keys.earliest_date
                .entry(batch.clone())
                .and_modify(|earliest| {
                    if is_iso_date(&row.date_in) && (!is_iso_date(earliest) || row.date_in < *earliest) {
                        *earliest = row.date_in.clone();
                    }
                })
                .or_insert_with(|| row.date_in.clone());

            if !keys.batch_owner.contains_key(&batch) {
                keys.batch_owner.insert(
                    batch.clone(),
                    BatchOwner {
                        position,
                        brand_name: row.brand_name.clone(),
                        sku_code: row.sku_code.clone(),
                    },
                );
                keys.batch_numbers.push(batch);
            }
        }

        keys
    }
}
