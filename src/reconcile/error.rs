use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline stage, reported as `phase` when a request aborts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Config,
    Validate,
    ResolveBrands,
    ResolveSkus,
    ResolveBatches,
    UpsertBatches,
    RefetchBatches,
    InsertInventory,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Config => "config",
            Phase::Validate => "validate",
            Phase::ResolveBrands => "resolve_brands",
            Phase::ResolveSkus => "resolve_skus",
            Phase::ResolveBatches => "resolve_batches",
            Phase::UpsertBatches => "upsert_batches",
            Phase::RefetchBatches => "refetch_batches",
            Phase::InsertInventory => "insert_inventory",
        }
    }

    /// Tag an infrastructure failure with this phase
    pub fn fail(self, err: impl fmt::Display) -> PipelineError {
        PipelineError {
            phase: self,
            message: format!("{:#}", err),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure that aborts the whole request
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{phase} failed: {message}")]
pub struct PipelineError {
    pub phase: Phase,
    pub message: String,
}
