use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::product::Product;

/// Order lifecycle states. Any state is reachable from any state at this
/// layer; the permissiveness is the contract (administrative correction
/// stays possible), and the backend may enforce a stricter graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// A finalized purchase. `total_amount` is computed once at creation from
/// its items and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Uuid,
    /// Set when a sales agent placed the order on a customer's behalf.
    #[serde(default)]
    pub sales_agent_id: Option<Uuid>,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub shipping_address: Option<Value>,
    #[serde(default)]
    pub billing_address: Option<Value>,
    /// Populated on joined detail reads only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
}

/// One product line in an order; immutable after the batch insert that
/// created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Persisted price snapshot taken at order time.
    pub price_at_time: BigDecimal,
    /// Normalized alias of `price_at_time`, filled on detail reads. The
    /// persisted field stays available for existing consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "super::product::deserialize_joined",
        skip_serializing_if = "Option::is_none"
    )]
    pub product: Option<Product>,
}

/// Explicit order line for agent-assisted orders that bypass the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl OrderItemInput {
    pub fn line_total(&self) -> BigDecimal {
        self.price.clone() * BigDecimal::from(self.quantity)
    }
}
