//! The data-store gateway: the narrow contract every service speaks to the
//! hosted backend through. [`PostgrestGateway`] is the production
//! implementation; tests substitute their own.
//!
//! [`PostgrestGateway`]: postgrest::PostgrestGateway

pub mod postgrest;
pub mod query;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use self::query::Query;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The single-row variant matched no rows. Expected in check-existence
    /// paths; terminal everywhere else.
    #[error("no rows returned")]
    NoRows,

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store error {code}: {message}")]
    Backend { code: String, message: String },

    /// A named remote procedure failed; `payload` is the error body exactly
    /// as the backend produced it.
    #[error("remote procedure failed: {payload}")]
    Rpc { payload: Value },

    #[error("malformed row payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Async port over named collections and remote procedures.
///
/// Rows cross this boundary as raw JSON values; decoding into domain types
/// happens on the caller's side.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// All rows matching the query.
    async fn select(&self, table: &str, query: Query) -> Result<Vec<Value>, StoreError>;

    /// Exactly one row; an empty result is `StoreError::NoRows`.
    async fn select_one(&self, table: &str, query: Query) -> Result<Value, StoreError>;

    /// Single-result variant that distinguishes "no rows" from real errors.
    async fn select_maybe(&self, table: &str, query: Query) -> Result<Option<Value>, StoreError> {
        match self.select_one(table, query).await {
            Ok(row) => Ok(Some(row)),
            Err(StoreError::NoRows) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Insert one row (object) or a batch (array), returning the stored
    /// representation including generated columns.
    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, StoreError>;

    /// Insert-or-update keyed on the `on_conflict` column list, returning the
    /// single resulting row.
    async fn upsert(&self, table: &str, row: Value, on_conflict: &str)
        -> Result<Value, StoreError>;

    /// Apply a partial update to every matching row, returning the updated
    /// representations.
    async fn update(&self, table: &str, query: Query, patch: Value)
        -> Result<Vec<Value>, StoreError>;

    /// Delete matching rows. Deleting nothing is success.
    async fn delete(&self, table: &str, query: Query) -> Result<(), StoreError>;

    /// Invoke a named remote procedure with the given parameters.
    async fn rpc(&self, name: &str, params: Value) -> Result<Value, StoreError>;
}
