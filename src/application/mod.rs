//! Service layer: catalog reads, cart lifecycle, cart-to-order conversion,
//! order queries, and membership resolution. Each service is constructed
//! with a shared gateway; none holds any other state, so every call is safe
//! to issue concurrently.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

pub use accounts::AccountService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use orders::OrderService;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::errors::StorefrontError;
use crate::store::StoreError;

pub(crate) fn decode<T: DeserializeOwned>(row: Value) -> Result<T, StorefrontError> {
    serde_json::from_value(row).map_err(|e| StorefrontError::Store(StoreError::Decode(e)))
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StorefrontError> {
    rows.into_iter().map(decode).collect()
}

/// A representation-returning write produced no row; surfaced as the store's
/// no-rows condition.
pub(crate) fn first_row(rows: Vec<Value>) -> Result<Value, StorefrontError> {
    rows.into_iter()
        .next()
        .ok_or(StorefrontError::Store(StoreError::NoRows))
}
