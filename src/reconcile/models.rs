//! Row and entity types flowing through the reconciliation pipeline

use crate::api::FilterValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row as submitted: arbitrary field names, string or number values
pub type RawRow = serde_json::Value;

/// Store primary key. Tables may use bigint or uuid keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{}", id),
            EntityId::Text(id) => f.write_str(id),
        }
    }
}

impl From<&EntityId> for FilterValue {
    fn from(id: &EntityId) -> Self {
        match id {
            EntityId::Int(id) => FilterValue::Integer(*id),
            EntityId::Text(id) => FilterValue::String(id.clone()),
        }
    }
}

/// Canonical row. All five business fields are non-empty once a row is
/// past validation; skipped rows may carry partial values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub sku_code: String,
    pub brand_name: String,
    pub batch_no: String,
    pub barcode: String,
    /// `YYYY-MM-DD` when parseable, otherwise the raw text
    pub date_in: String,
    pub warranty_months: Option<i64>,
    /// Position in the submitted `rows` array
    pub source_index: usize,
}

/// Diagnostic record for a row that was not inserted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    #[serde(flatten)]
    pub row: NormalizedRow,
    pub reason: String,
}

impl SkippedRow {
    pub fn new(row: NormalizedRow, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: EntityId,
    pub sku_code: String,
    pub brand_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: EntityId,
    pub batch_no: String,
    #[serde(default)]
    pub sku_id: Option<EntityId>,
    #[serde(default)]
    pub date_in: Option<String>,
}

/// Creation payload for a batch that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBatch {
    pub batch_no: String,
    pub sku_id: EntityId,
    pub date_in: String,
}

/// A row whose brand and SKU both resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub row: NormalizedRow,
    pub brand_id: EntityId,
    pub sku_id: EntityId,
}

/// Insertable inventory record: resolved foreign keys plus the
/// denormalized business fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryPayloadItem {
    pub barcode: String,
    pub sku_id: EntityId,
    pub batch_id: EntityId,
    pub sku_code: String,
    pub brand_name: String,
    pub batch_no: String,
    pub date_in: String,
    pub warranty_months: Option<i64>,
    #[serde(skip)]
    pub source_index: usize,
}

impl InventoryPayloadItem {
    /// `batch_no` is copied from the stored batch, not the row's spelling
    pub fn from_resolved(resolved: &ResolvedRow, batch: &Batch) -> Self {
        let row = &resolved.row;
        Self {
            barcode: row.barcode.clone(),
            sku_id: resolved.sku_id.clone(),
            batch_id: batch.id.clone(),
            sku_code: row.sku_code.clone(),
            brand_name: row.brand_name.clone(),
            batch_no: batch.batch_no.clone(),
            date_in: row.date_in.clone(),
            warranty_months: row.warranty_months,
            source_index: row.source_index,
        }
    }

    /// The business fields back as a row, for skip diagnostics
    pub fn to_row(&self) -> NormalizedRow {
        NormalizedRow {
            sku_code: self.sku_code.clone(),
            brand_name: self.brand_name.clone(),
            batch_no: self.batch_no.clone(),
            barcode: self.barcode.clone(),
            date_in: self.date_in.clone(),
            warranty_months: self.warranty_months,
            source_index: self.source_index,
        }
    }
}
