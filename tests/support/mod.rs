//! In-memory `StoreGateway` used by the integration suites: real filter,
//! upsert, and embedding semantics over JSON rows, plus per-table failure
//! injection, canned RPC results, and a call counter for asserting that
//! validation short-circuits before any store call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use storefront_core::store::query::{Filter, Query};
use storefront_core::store::{StoreError, StoreGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    calls: AtomicUsize,
    failures: Mutex<Vec<(Op, String)>>,
    rpc_result: Mutex<Option<Result<Value, StoreError>>>,
    rpc_calls: Mutex<Vec<(String, Value)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent `op` against `table` fail.
    pub fn fail_on(&self, op: Op, table: &str) {
        self.failures.lock().unwrap().push((op, table.to_string()));
    }

    pub fn set_rpc_result(&self, result: Result<Value, StoreError>) {
        *self.rpc_result.lock().unwrap() = Some(result);
    }

    pub fn rpc_calls(&self) -> Vec<(String, Value)> {
        self.rpc_calls.lock().unwrap().clone()
    }

    fn check_failure(&self, op: Op, table: &str) -> Result<(), StoreError> {
        let failures = self.failures.lock().unwrap();
        if failures.iter().any(|(o, t)| *o == op && t == table) {
            return Err(StoreError::Backend {
                code: "XX000".to_string(),
                message: format!("injected failure for {table}"),
            });
        }
        Ok(())
    }

    fn query_rows(&self, table: &str, query: &Query) -> Vec<Value> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_filters(row, query.filters()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some((column, ascending)) = query.order_by() {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(column), b.get(column));
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        let offset = query.offset().unwrap_or(0);
        let limit = query.limit().unwrap_or(usize::MAX);
        let mut rows: Vec<Value> = rows.into_iter().skip(offset).take(limit).collect();
        if let Some(selection) = query.selection() {
            for row in &mut rows {
                self.embed(row, selection, &tables);
            }
        }
        rows
    }

    /// Emulate the two embeddings the services use: a many-to-one joined
    /// product and an order's item list (with nested products).
    fn embed(&self, row: &mut Value, selection: &str, tables: &HashMap<String, Vec<Value>>) {
        if selection.contains("items:order_items") {
            let order_id = row.get("id").cloned().unwrap_or(Value::Null);
            let mut items: Vec<Value> = tables
                .get("order_items")
                .map(|rows| {
                    rows.iter()
                        .filter(|item| item.get("order_id") == Some(&order_id))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            if selection.contains("product:products") {
                for item in &mut items {
                    attach_product(item, tables);
                }
            }
            row["items"] = Value::Array(items);
        } else if selection.contains("product:products") {
            attach_product(row, tables);
        }
    }
}

fn attach_product(row: &mut Value, tables: &HashMap<String, Vec<Value>>) {
    let product_id = row.get("product_id").cloned().unwrap_or(Value::Null);
    let product = tables
        .get("products")
        .and_then(|rows| {
            rows.iter()
                .find(|product| product.get("id") == Some(&product_id))
        })
        .cloned()
        .unwrap_or(Value::Null);
    row["product"] = product;
}

fn matches_filters(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq(column, value) => row.get(column) == Some(value),
        Filter::In(column, values) => row
            .get(column)
            .map(|v| values.contains(v))
            .unwrap_or(false),
        Filter::OrIlike(clauses) => clauses.iter().any(|(column, pattern)| {
            let needle = pattern.replace(['*', '%'], "").to_lowercase();
            row.get(column)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false)
        }),
    })
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        _ => std::cmp::Ordering::Equal,
    }
}

/// Fill backend-generated columns the way the real store's defaults would.
fn with_defaults(mut row: Value) -> Value {
    let now = json!(Utc::now());
    let obj = row.as_object_mut().expect("row must be an object");
    obj.entry("id".to_string())
        .or_insert_with(|| json!(Uuid::new_v4()));
    obj.entry("created_at".to_string()).or_insert_with(|| now.clone());
    obj.entry("updated_at".to_string()).or_insert_with(|| now.clone());
    row
}

#[async_trait]
impl StoreGateway for MemoryStore {
    async fn select(&self, table: &str, query: Query) -> Result<Vec<Value>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(Op::Select, table)?;
        Ok(self.query_rows(table, &query))
    }

    async fn select_one(&self, table: &str, query: Query) -> Result<Value, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(Op::Select, table)?;
        self.query_rows(table, &query)
            .into_iter()
            .next()
            .ok_or(StoreError::NoRows)
    }

    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(Op::Insert, table)?;
        let incoming = match rows {
            Value::Array(rows) => rows,
            row => vec![row],
        };
        let inserted: Vec<Value> = incoming.into_iter().map(with_defaults).collect();
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(inserted.clone());
        Ok(inserted)
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(Op::Insert, table)?;
        let keys: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        if let Some(existing) = rows.iter_mut().find(|candidate| {
            keys.iter()
                .all(|key| candidate.get(*key) == row.get(*key))
        }) {
            // merge-duplicates: incoming columns overwrite existing ones.
            if let (Some(target), Some(patch)) = (existing.as_object_mut(), row.as_object()) {
                for (key, value) in patch {
                    target.insert(key.clone(), value.clone());
                }
                target.insert("updated_at".to_string(), json!(Utc::now()));
            }
            return Ok(existing.clone());
        }

        let inserted = with_defaults(row);
        rows.push(inserted.clone());
        Ok(inserted)
    }

    async fn update(
        &self,
        table: &str,
        query: Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(Op::Update, table)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if matches_filters(row, query.filters()) {
                if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                    for (key, value) in fields {
                        target.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: Query) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(Op::Delete, table)?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| !matches_filters(row, query.filters()));
        }
        Ok(())
    }

    async fn rpc(&self, name: &str, params: Value) -> Result<Value, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rpc_calls
            .lock()
            .unwrap()
            .push((name.to_string(), params));
        match self.rpc_result.lock().unwrap().take() {
            Some(result) => result,
            None => Err(StoreError::Backend {
                code: "PGRST202".to_string(),
                message: format!("unknown function {name}"),
            }),
        }
    }
}
