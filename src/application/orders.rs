use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{decode, decode_rows};
use crate::domain::errors::StorefrontError;
use crate::domain::order::{Order, OrderStatus};
use crate::store::query::Query;
use crate::store::StoreGateway;

/// Reads over persisted orders and the status transition.
pub struct OrderService<G> {
    store: Arc<G>,
}

impl<G: StoreGateway> OrderService<G> {
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    /// Order history, newest first. `None` returns orders across all users;
    /// that administrative mode is gated by the caller, not here.
    pub async fn customer_order_history(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Vec<Order>, StorefrontError> {
        let mut query = Query::new().order("order_date", false);
        if let Some(user_id) = user_id {
            query = query.eq("user_id", json!(user_id));
        }
        decode_rows(self.store.select("orders", query).await?)
    }

    /// One order with its lines and each line's live product. Every line's
    /// normalized `price` is filled from the persisted `price_at_time`.
    pub async fn order_details(&self, order_id: Uuid) -> Result<Order, StorefrontError> {
        let query = Query::new()
            .select("*, items:order_items(*, product:products(*))")
            .eq("id", json!(order_id));
        let row = self
            .store
            .select_maybe("orders", query)
            .await?
            .ok_or(StorefrontError::NotFound("order"))?;
        let mut order: Order = decode(row)?;
        for item in &mut order.items {
            item.price = Some(item.price_at_time.clone());
        }
        Ok(order)
    }

    /// Set an order's status. No transition graph is enforced at this
    /// layer; any state is reachable from any state.
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, StorefrontError> {
        let rows = self
            .store
            .update(
                "orders",
                Query::new().eq("id", json!(order_id)),
                json!({ "status": status, "updated_at": Utc::now() }),
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(StorefrontError::NotFound("order"))?;
        decode(row)
    }
}
