//! Query result handling
//!
//! Handles JSON array responses from the store

use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub success: bool,
    pub rows: Vec<Value>,
    pub error: Option<String>,
    pub status_code: Option<u16>,
}

impl QueryResult {
    pub fn success(rows: Vec<Value>, status_code: u16) -> Self {
        Self {
            success: true,
            rows,
            error: None,
            status_code: Some(status_code),
        }
    }

    pub fn error(error: String, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            rows: Vec::new(),
            error: Some(error),
            status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get number of rows returned
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows were returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Turn a failed read into an error carrying status and body
    pub fn into_rows(self) -> anyhow::Result<Vec<Value>> {
        if self.success {
            Ok(self.rows)
        } else {
            anyhow::bail!(
                "store returned {}: {}",
                self.status_code.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()),
                self.error.unwrap_or_default()
            )
        }
    }
}

/// Count of rows covered by a `Content-Range` range part (`0-24/...` → 25)
pub fn parse_content_range_len(header: &str) -> Option<u64> {
    let (range, total) = header.trim().rsplit_once('/')?;
    if range == "*" {
        return total.parse().ok();
    }
    let (first, last) = range.split_once('-')?;
    let first: u64 = first.parse().ok()?;
    let last: u64 = last.parse().ok()?;
    Some(last.saturating_sub(first) + 1)
}
