//! In-memory store for integration tests
//!
//! Evaluates the typed filter tree directly and enforces the same unique
//! constraints as the production schema:
//! `skus (brand_id, sku_code)`, `batches (batch_no)`, `inventory (barcode)`.

#![allow(dead_code)]

use async_trait::async_trait;
use inventory_sync::api::{
    Filter, FilterValue, Query, QueryResult, Resolution, Returning, Store, Write, WriteResult,
};
use inventory_sync::config::{Config, PipelineSettings, TableNames};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const UNIQUE_VIOLATION_BODY: &str =
    r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    next_id: i64,
    failing_selects: HashSet<String>,
    failing_writes: HashSet<String>,
    /// Next write to the table is won by a concurrent writer
    raced_writes: HashSet<String>,
    select_calls: HashMap<String, usize>,
    write_calls: HashMap<String, usize>,
    last_filters: HashMap<String, Vec<Filter>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_brand(&self, name: &str) -> i64 {
        self.seed("brands", json!({ "name": name }))
    }

    pub fn seed_sku(&self, brand_id: i64, sku_code: &str) -> i64 {
        self.seed("skus", json!({ "brand_id": brand_id, "sku_code": sku_code }))
    }

    pub fn seed_batch(&self, batch_no: &str, sku_id: i64, date_in: &str) -> i64 {
        self.seed("batches", json!({ "batch_no": batch_no, "sku_id": sku_id, "date_in": date_in }))
    }

    pub fn seed(&self, table: &str, mut row: Value) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        row["id"] = json!(id);
        inner.tables.entry(table.to_string()).or_default().push(row);
        id
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let inner = self.inner.lock().unwrap();
        inner.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn select_calls(&self, table: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.select_calls.get(table).copied().unwrap_or(0)
    }

    pub fn write_calls(&self, table: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.write_calls.get(table).copied().unwrap_or(0)
    }

    /// Filters of every select issued against `table`, in order
    pub fn filters(&self, table: &str) -> Vec<Filter> {
        let inner = self.inner.lock().unwrap();
        inner.last_filters.get(table).cloned().unwrap_or_default()
    }

    pub fn fail_selects_on(&self, table: &str) {
        self.inner.lock().unwrap().failing_selects.insert(table.to_string());
    }

    pub fn fail_writes_on(&self, table: &str) {
        self.inner.lock().unwrap().failing_writes.insert(table.to_string());
    }

    /// The next write to `table` lands as if another request committed the
    /// same rows first, and this caller gets a unique violation
    pub fn race_next_write(&self, table: &str) {
        self.inner.lock().unwrap().raced_writes.insert(table.to_string());
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, query: &Query) -> anyhow::Result<QueryResult> {
        let mut inner = self.inner.lock().unwrap();
        *inner.select_calls.entry(query.table.clone()).or_default() += 1;
        if let Some(filter) = &query.filter {
            inner.last_filters.entry(query.table.clone()).or_default().push(filter.clone());
        }

        if inner.failing_selects.contains(&query.table) {
            return Ok(QueryResult::error(
                r#"{"message":"relation is unavailable"}"#.to_string(),
                Some(503),
            ));
        }

        let mut rows: Vec<Value> = inner
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filter.as_ref().is_none_or(|f| matches(f, row)))
                    .map(|row| project(row, query.select.as_deref()))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        Ok(QueryResult::success(rows, 200))
    }

    async fn write(&self, write: &Write) -> anyhow::Result<WriteResult> {
        let mut inner = self.inner.lock().unwrap();
        *inner.write_calls.entry(write.table.clone()).or_default() += 1;

        if inner.failing_writes.contains(&write.table) {
            return Ok(WriteResult::error(
                r#"{"code":"XX000","message":"internal error"}"#.to_string(),
                Some(500),
            ));
        }

        if inner.raced_writes.remove(&write.table) {
            let mut winner = Write::insert(write.table.clone(), write.rows.clone()).ignore_duplicates();
            winner.on_conflict = write.on_conflict.clone();
            apply(&mut inner, &winner)?;
            return Ok(WriteResult::error(UNIQUE_VIOLATION_BODY.to_string(), Some(409)));
        }

        apply(&mut inner, write)
    }
}

/// Apply a write atomically: a plain insert that collides changes nothing
fn apply(inner: &mut Inner, write: &Write) -> anyhow::Result<WriteResult> {
    let mut table = inner.tables.get(&write.table).cloned().unwrap_or_default();
    let mut next_id = inner.next_id;
    let mut written = Vec::new();

    for incoming in &write.rows {
        let key = unique_key(&write.table, incoming);
        let existing = key
            .as_ref()
            .and_then(|key| table.iter().position(|row| unique_key(&write.table, row).as_ref() == Some(key)));

        match (existing, write.resolution) {
            (Some(_), Resolution::Error) => {
                return Ok(WriteResult::error(UNIQUE_VIOLATION_BODY.to_string(), Some(409)));
            }
            (Some(_), Resolution::IgnoreDuplicates) => {}
            (Some(idx), Resolution::MergeDuplicates) => {
                if let (Some(target), Some(fields)) = (table[idx].as_object_mut(), incoming.as_object()) {
                    for (field, value) in fields {
                        if field != "id" {
                            target.insert(field.clone(), value.clone());
                        }
                    }
                }
                written.push(table[idx].clone());
            }
            (None, _) => {
                let mut row = incoming.clone();
                if row.get("id").is_none() {
                    next_id += 1;
                    row["id"] = json!(next_id);
                }
                table.push(row.clone());
                written.push(row);
            }
        }
    }

    inner.tables.insert(write.table.clone(), table);
    inner.next_id = next_id;

    let affected = write.count.then_some(written.len() as u64);
    let echoed = match write.returning {
        Returning::Representation => written
            .iter()
            .map(|row| project(row, write.select.as_deref()))
            .collect(),
        Returning::Minimal => Vec::new(),
    };
    Ok(WriteResult::success(201, echoed, affected))
}

fn unique_key(table: &str, row: &Value) -> Option<Vec<String>> {
    let columns: &[&str] = match table {
        "skus" => &["brand_id", "sku_code"],
        "batches" => &["batch_no"],
        "inventory" => &["barcode"],
        _ => return None,
    };
    columns
        .iter()
        .map(|column| row.get(*column).map(text))
        .collect()
}

fn project(row: &Value, select: Option<&[String]>) -> Value {
    match (select, row.as_object()) {
        (Some(columns), Some(object)) => {
            let mut projected = Map::new();
            for column in columns {
                if let Some(value) = object.get(column) {
                    projected.insert(column.clone(), value.clone());
                }
            }
            Value::Object(projected)
        }
        _ => row.clone(),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_eq(value: Option<&Value>, expected: &FilterValue) -> bool {
    match (value, expected) {
        (None | Some(Value::Null), FilterValue::Null) => true,
        (Some(Value::Bool(b)), FilterValue::Boolean(e)) => b == e,
        (Some(v), FilterValue::Integer(e)) => v.as_i64() == Some(*e) || v.as_str() == Some(&e.to_string()),
        (Some(v), FilterValue::String(e)) => text(v) == *e,
        _ => false,
    }
}

fn matches(filter: &Filter, row: &Value) -> bool {
    match filter {
        Filter::Eq(field, value) => value_eq(row.get(field), value),
        Filter::Neq(field, value) => !value_eq(row.get(field), value),
        Filter::In(field, values) => values.iter().any(|v| value_eq(row.get(field), v)),
        Filter::ILike(field, pattern) => row
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| like_match(pattern, s)),
        Filter::IsNull(field) => matches!(row.get(field), None | Some(Value::Null)),
        Filter::And(filters) => filters.iter().all(|f| matches(f, row)),
        Filter::Or(filters) => filters.iter().any(|f| matches(f, row)),
        Filter::Not(inner) => !matches(inner, row),
    }
}

enum Token {
    Any,
    One,
    Literal(char),
}

/// Case-insensitive LIKE: `%` and `_` are wildcards unless backslash-escaped
fn like_match(pattern: &str, text: &str) -> bool {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars().flat_map(char::to_lowercase);
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => match chars.next() {
                Some(next) => Token::Literal(next),
                None => Token::Literal('\\'),
            },
            '%' => Token::Any,
            '_' => Token::One,
            other => Token::Literal(other),
        });
    }
    let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    // Greedy wildcard match, backtracking to the last `%`
    let (mut t, mut p) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;
    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Any) => {
                resume = Some((p, t));
                p += 1;
            }
            Some(Token::One) => {
                p += 1;
                t += 1;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match resume {
                Some((star, from)) => {
                    p = star + 1;
                    t = from + 1;
                    resume = Some((star, from + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p..].iter().all(|token| matches!(token, Token::Any))
}

/// A complete raw row using the canonical field names
pub fn raw_row(sku: &str, brand: &str, batch: &str, barcode: &str, date: &str) -> Value {
    json!({
        "sku_code": sku,
        "brand_name": brand,
        "batch_no": batch,
        "barcode": barcode,
        "date_in": date,
    })
}

pub fn settings() -> PipelineSettings {
    PipelineSettings::default()
}

pub fn tables() -> TableNames {
    TableNames::default()
}

/// Config with placeholder credentials, so the server accepts imports
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.store.url = "http://store.test".to_string();
    config.store.service_key = "test-service-key".to_string();
    config
}
