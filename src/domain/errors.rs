use serde_json::Value;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The named entity does not exist where its existence was required.
    /// "No rows" in a check-existence path never reaches this variant.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Malformed input, rejected before any store call is issued.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Any other gateway failure; always propagated, never retried.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A remote procedure failed; `payload` is its error body verbatim.
    #[error("remote procedure {procedure} failed: {payload}")]
    Rpc { procedure: String, payload: Value },
}
