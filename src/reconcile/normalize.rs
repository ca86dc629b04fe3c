//! Row normalization: alias mapping, trimming, date and integer coercion

use super::models::{NormalizedRow, RawRow, SkippedRow};
use crate::config::DateOrder;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const MISSING_FIELDS_REASON: &str = "Missing required field(s)";

/// Accepted spellings per canonical field, highest priority first.
/// Compared after lowercasing and dropping `_`, `-` and spaces.
const SKU_ALIASES: &[&str] = &["skucode", "sku", "code"];
const BRAND_ALIASES: &[&str] = &["brandname", "brand"];
const BATCH_ALIASES: &[&str] = &["batchno", "batch", "batchnumber"];
const BARCODE_ALIASES: &[&str] = &["barcode", "code128", "serial"];
const DATE_ALIASES: &[&str] = &["datein", "date"];
const WARRANTY_ALIASES: &[&str] = &["warrantymonths", "warranty"];

static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})$").expect("valid regex"));
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})(?:[T ].*)?$").expect("valid regex"));
static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("valid regex"));

/// Split raw rows into canonical rows and rows missing required fields
pub fn normalize_rows(raw_rows: &[RawRow], date_order: DateOrder) -> (Vec<NormalizedRow>, Vec<SkippedRow>) {
    let mut valid = Vec::with_capacity(raw_rows.len());
    let mut skipped = Vec::new();

    for (index, raw) in raw_rows.iter().enumerate() {
        let row = normalize_row(raw, index, date_order);
        let missing = missing_fields(&row);
        if missing.is_empty() {
            valid.push(row);
        } else {
            skipped.push(SkippedRow::new(
                row,
                format!("{}: {}", MISSING_FIELDS_REASON, missing.join(", ")),
            ));
        }
    }

    (valid, skipped)
}

/// Map one raw row onto the canonical schema without validating it
pub fn normalize_row(raw: &RawRow, source_index: usize, date_order: DateOrder) -> NormalizedRow {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or(&empty);

    let mut by_canonical: HashMap<String, &Value> = HashMap::with_capacity(object.len());
    for (key, value) in object {
        by_canonical.entry(canonical_key(key)).or_insert(value);
    }

    let text = |aliases: &[&str]| -> String {
        aliases
            .iter()
            .filter_map(|alias| by_canonical.get(*alias))
            .map(|value| value_to_text(value))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    };

    let date_raw = text(DATE_ALIASES);
    let warranty = WARRANTY_ALIASES
        .iter()
        .filter_map(|alias| by_canonical.get(*alias))
        .find_map(|value| coerce_int(value));

    NormalizedRow {
        sku_code: text(SKU_ALIASES),
        brand_name: text(BRAND_ALIASES),
        batch_no: text(BATCH_ALIASES),
        barcode: text(BARCODE_ALIASES),
        date_in: normalize_date(&date_raw, date_order),
        warranty_months: warranty,
        source_index,
    }
}

fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn missing_fields(row: &NormalizedRow) -> Vec<&'static str> {
    [
        ("sku_code", &row.sku_code),
        ("brand_name", &row.brand_name),
        ("batch_no", &row.batch_no),
        ("barcode", &row.barcode),
        ("date_in", &row.date_in),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect()
}

/// Normalize to `YYYY-MM-DD`. Unparseable input is returned trimmed but
/// otherwise untouched so the store can reject it.
pub fn normalize_date(raw: &str, date_order: DateOrder) -> String {
    let raw = raw.trim();

    if let Some(caps) = SLASH_DATE.captures(raw) {
        let first: u32 = caps[1].parse().unwrap_or(0);
        let second: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        let (month, day) = match date_order {
            DateOrder::MonthFirst => (first, second),
            DateOrder::DayFirst => (second, first),
        };
        return format_date(year, month, day).unwrap_or_else(|| raw.to_string());
    }

    if let Some(caps) = ISO_DATE.captures(raw) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        return format_date(year, month, day).unwrap_or_else(|| raw.to_string());
    }

    raw.to_string()
}

fn format_date(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Empty or non-numeric → absent; strings use their leading integer;
/// floats are truncated, and out of `i64` range they are absent
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => LEADING_INT
            .find(s.trim())
            .and_then(|m| m.as_str().parse::<i64>().ok()),
        _ => None,
    }
}
