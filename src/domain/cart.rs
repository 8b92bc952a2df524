use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::Product;

/// One shopping session, scoped to exactly one `(user, seller organization)`
/// pair. At most one live cart exists per pair; conversion empties it rather
/// than deleting it, so it can be reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product line in a cart. `price` is the snapshot taken when the
/// product was first added (first-write-wins) and never tracks the live
/// product price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// The live joined product, when the read embedded it and the product
    /// still exists.
    #[serde(
        default,
        deserialize_with = "super::product::deserialize_joined",
        skip_serializing_if = "Option::is_none"
    )]
    pub product: Option<Product>,
}

impl CartItem {
    /// quantity × price-at-addition.
    pub fn line_total(&self) -> BigDecimal {
        self.price.clone() * BigDecimal::from(self.quantity)
    }
}
