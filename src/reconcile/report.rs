//! Response aggregation
//!
//! Every response carries the full counter set, including failures, so a
//! caller can render partial progress.

use super::error::{Phase, PipelineError};
use super::insert::InsertOutcome;
use super::models::SkippedRow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows inserted
    pub added: usize,
    #[serde(rename = "addedCount")]
    pub added_count: usize,
    /// Length of the full skip list, not the capped one
    pub skipped: usize,
    pub inserted: usize,
    pub duplicates_skipped: usize,
    #[serde(rename = "skippedRows")]
    pub skipped_rows: Vec<SkippedRow>,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

impl ImportReport {
    /// A report for a request that was rejected before any processing
    pub fn rejected(phase: Phase, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            phase: Some(phase),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Accumulates skips, insert totals and phase notes across the pipeline
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    skipped: Vec<SkippedRow>,
    inserted: usize,
    duplicates: usize,
    notes: Vec<String>,
    skipped_rows_cap: usize,
    reason_max_len: usize,
}

impl ReportBuilder {
    pub fn new(skipped_rows_cap: usize, reason_max_len: usize) -> Self {
        Self {
            skipped: Vec::new(),
            inserted: 0,
            duplicates: 0,
            notes: Vec::new(),
            skipped_rows_cap,
            reason_max_len,
        }
    }

    pub fn skip(&mut self, mut row: SkippedRow) {
        row.reason = truncate(&row.reason, self.reason_max_len);
        self.skipped.push(row);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = SkippedRow>) {
        for row in rows {
            self.skip(row);
        }
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Fold in insert totals; skips move into the report's list
    pub fn record_inserts(&mut self, outcome: InsertOutcome) {
        self.inserted += outcome.inserted;
        self.duplicates += outcome.duplicates;
        self.extend(outcome.skipped);
    }

    pub fn finish(self) -> ImportReport {
        let note = self.notes.join("; ");
        let skipped = self.skipped.len();
        let mut skipped_rows = self.skipped;
        skipped_rows.truncate(self.skipped_rows_cap);

        ImportReport {
            added: self.inserted,
            added_count: self.inserted,
            skipped,
            inserted: self.inserted,
            duplicates_skipped: self.duplicates,
            skipped_rows,
            note,
            error: None,
            phase: None,
        }
    }

    /// Finish with the counters gathered so far plus the failure
    pub fn fail(self, err: PipelineError) -> ImportReport {
        let mut report = self.finish();
        report.error = Some(err.message);
        report.phase = Some(err.phase);
        report
    }
}

fn truncate(reason: &str, max_chars: usize) -> String {
    match reason.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => reason[..byte_idx].to_string(),
        None => reason.to_string(),
    }
}
