//! Core write types for bulk store inserts and upserts

use crate::api::constants::{UNIQUE_VIOLATION, headers};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the store treats rows that collide with `on_conflict`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Plain insert; a collision fails the request
    Error,
    /// Update the existing row with the incoming values
    MergeDuplicates,
    /// Keep the existing row and drop the incoming one
    IgnoreDuplicates,
}

/// What the store sends back for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Returning {
    /// Echo the rows actually written
    Representation,
    /// Empty body
    Minimal,
}

/// A bulk write against one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Write {
    /// Target table (e.g., "batches", "inventory")
    pub table: String,
    /// Records as JSON objects
    pub rows: Vec<Value>,
    /// Uniqueness constraint columns for conflict resolution
    pub on_conflict: Option<String>,
    pub resolution: Resolution,
    pub returning: Returning,
    /// Columns to echo when returning representation
    pub select: Option<Vec<String>>,
    /// Ask for an exact affected-row count in `Content-Range`
    pub count: bool,
}

/// Result of executing a Write
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteResult {
    /// Whether the store accepted the write
    pub success: bool,
    /// HTTP status code from the response
    pub status_code: Option<u16>,
    /// Echoed rows (empty with `Returning::Minimal`)
    pub rows: Vec<Value>,
    /// Affected row count from `Content-Range`, if requested
    pub affected: Option<u64>,
    /// Raw error body if the write failed
    pub error: Option<String>,
}

impl Write {
    /// Insert rows; combine with the conflict builders below for upserts
    pub fn insert(table: impl Into<String>, rows: Vec<Value>) -> Self {
        Self {
            table: table.into(),
            rows,
            on_conflict: None,
            resolution: Resolution::Error,
            returning: Returning::Minimal,
            select: None,
            count: false,
        }
    }

    pub fn on_conflict(mut self, columns: impl Into<String>) -> Self {
        self.on_conflict = Some(columns.into());
        self
    }

    pub fn merge_duplicates(mut self) -> Self {
        self.resolution = Resolution::MergeDuplicates;
        self
    }

    pub fn ignore_duplicates(mut self) -> Self {
        self.resolution = Resolution::IgnoreDuplicates;
        self
    }

    pub fn returning(mut self, returning: Returning) -> Self {
        self.returning = returning;
        self
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn exact_count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Value of the `Prefer` header for this write
    pub fn prefer_header(&self) -> String {
        let mut parts = Vec::new();
        match self.resolution {
            Resolution::MergeDuplicates => parts.push(headers::PREFER_MERGE_DUPLICATES),
            Resolution::IgnoreDuplicates => parts.push(headers::PREFER_IGNORE_DUPLICATES),
            Resolution::Error => {}
        }
        parts.push(match self.returning {
            Returning::Representation => headers::PREFER_RETURN_REPRESENTATION,
            Returning::Minimal => headers::PREFER_RETURN_MINIMAL,
        });
        if self.count {
            parts.push(headers::PREFER_COUNT_EXACT);
        }
        parts.join(",")
    }

    /// Query parameters (`on_conflict`, `select`)
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(columns) = &self.on_conflict {
            params.push(("on_conflict".to_string(), columns.clone()));
        }
        if self.returning == Returning::Representation {
            if let Some(select) = &self.select {
                params.push(("select".to_string(), select.join(",")));
            }
        }
        params
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl WriteResult {
    pub fn success(status_code: u16, rows: Vec<Value>, affected: Option<u64>) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            rows,
            affected,
            error: None,
        }
    }

    pub fn error(error: String, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            status_code,
            rows: Vec::new(),
            affected: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// A unique-constraint rejection: another writer got there first
    pub fn is_conflict(&self) -> bool {
        !self.success
            && (self.status_code == Some(409)
                || self.error.as_deref().is_some_and(|e| e.contains(UNIQUE_VIOLATION)))
    }

    /// Values of `field` across echoed rows, stringified
    pub fn echoed_strings(&self, field: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get(field))
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }
}
