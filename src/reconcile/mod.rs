//! Bulk inventory reconciliation
//!
//! Raw rows are normalized, their brand/SKU/batch references resolved in
//! chunked lookups, missing batches created, and the resulting inventory
//! records inserted in chunks with duplicate barcodes ignored.

pub mod error;
pub mod insert;
pub mod keys;
pub mod models;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod upsert;

pub use error::{Phase, PipelineError};
pub use models::{Batch, Brand, EntityId, InventoryPayloadItem, NormalizedRow, RawRow, SkippedRow, Sku};
pub use pipeline::Reconciler;
pub use report::ImportReport;
