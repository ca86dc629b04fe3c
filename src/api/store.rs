//! The seam between the reconciliation pipeline and the external store

use super::operations::{Write, WriteResult};
use super::query::{Query, QueryResult};
use async_trait::async_trait;

/// Filtered reads and conflict-aware bulk writes over named tables.
///
/// `Err` means no usable response came back (transport failure).
/// A response with a non-success status is returned as `Ok` with
/// `success == false` so the caller decides whether it is fatal.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, query: &Query) -> anyhow::Result<QueryResult>;

    async fn write(&self, write: &Write) -> anyhow::Result<WriteResult>;
}
