use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{decode, decode_rows, first_row};
use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::StorefrontError;
use crate::domain::order::{Order, OrderItemInput, OrderStatus};
use crate::store::query::Query;
use crate::store::{StoreError, StoreGateway};

/// Name of the server-side procedure performing the whole conversion as one
/// atomic unit.
const CONVERT_PROCEDURE: &str = "create_order_from_cart";

/// Converts carts into orders.
///
/// Two interchangeable strategies: a client-orchestrated sequence of store
/// calls with no cross-step rollback, and a single atomic remote procedure
/// for backends that provide one.
pub struct CheckoutService<G> {
    store: Arc<G>,
}

impl<G: StoreGateway> CheckoutService<G> {
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    /// Client-orchestrated conversion: resolve the cart, read its items,
    /// insert the order, insert the order items, then clear the cart.
    ///
    /// Each step is a separate round trip and there is no rollback. Failing
    /// before the order insert leaves no side effects. A failed item insert
    /// leaves an order with zero items — detectable, not self-healed here.
    /// A failed cart clear is logged and suppressed: the order is already
    /// durable and a leftover non-empty cart is recoverable.
    pub async fn create_order_from_cart(
        &self,
        user_id: Uuid,
        business_id: Uuid,
    ) -> Result<Order, StorefrontError> {
        // 1. Resolve the cart for the pair.
        let cart: Cart = match self
            .store
            .select_maybe(
                "carts",
                Query::new()
                    .eq("user_id", json!(user_id))
                    .eq("business_id", json!(business_id)),
            )
            .await?
        {
            Some(row) => decode(row)?,
            None => return Err(StorefrontError::NotFound("cart")),
        };

        // 2. Read its lines.
        let items: Vec<CartItem> = decode_rows(
            self.store
                .select("cart_items", Query::new().eq("cart_id", json!(cart.id)))
                .await?,
        )?;
        if items.is_empty() {
            return Err(StorefrontError::Validation("cart is empty".to_string()));
        }

        // 3. Total over the price snapshots, not live product prices.
        let total = items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.line_total());

        // 4. Order header.
        let order: Order = decode(first_row(
            self.store
                .insert(
                    "orders",
                    json!({
                        "user_id": user_id,
                        "business_id": business_id,
                        "total_amount": total,
                        "status": OrderStatus::Pending,
                        "order_date": Utc::now(),
                    }),
                )
                .await?,
        )?)?;

        // 5. Order lines, snapshotting price-at-add into price_at_time.
        let lines: Vec<Value> = items
            .iter()
            .map(|item| {
                json!({
                    "order_id": order.id,
                    "product_id": item.product_id,
                    "quantity": item.quantity,
                    "price_at_time": item.price,
                })
            })
            .collect();
        self.store.insert("order_items", Value::Array(lines)).await?;

        // 6. Clear the cart, best effort.
        if let Err(err) = self
            .store
            .delete("cart_items", Query::new().eq("cart_id", json!(cart.id)))
            .await
        {
            log::warn!(
                "order {} created but cart {} was not cleared: {err}",
                order.id,
                cart.id
            );
        }

        Ok(order)
    }

    /// Atomic conversion through the server-side procedure. Parameters pass
    /// through unchanged and the procedure's result is returned verbatim;
    /// either the order exists complete or nothing changed.
    pub async fn create_order_from_cart_atomic(
        &self,
        user_id: Uuid,
        business_id: Uuid,
    ) -> Result<Order, StorefrontError> {
        let params = json!({ "user_id": user_id, "business_id": business_id });
        match self.store.rpc(CONVERT_PROCEDURE, params).await {
            Ok(value) => decode(value),
            Err(StoreError::Rpc { payload }) => Err(StorefrontError::Rpc {
                procedure: CONVERT_PROCEDURE.to_string(),
                payload,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Agent-assisted order from an explicit line list, bypassing any cart.
    /// Same two-step, no-rollback write semantics as the cart path.
    pub async fn create_order_for_customer(
        &self,
        customer_id: Uuid,
        business_id: Uuid,
        sales_agent_id: Uuid,
        items: &[OrderItemInput],
    ) -> Result<Order, StorefrontError> {
        if items.is_empty() {
            return Err(StorefrontError::Validation(
                "order items must not be empty".to_string(),
            ));
        }

        let total = items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.line_total());

        let order: Order = decode(first_row(
            self.store
                .insert(
                    "orders",
                    json!({
                        "user_id": customer_id,
                        "business_id": business_id,
                        "sales_agent_id": sales_agent_id,
                        "total_amount": total,
                        "status": OrderStatus::Pending,
                        "order_date": Utc::now(),
                    }),
                )
                .await?,
        )?)?;

        let lines: Vec<Value> = items
            .iter()
            .map(|item| {
                json!({
                    "order_id": order.id,
                    "product_id": item.product_id,
                    "quantity": item.quantity,
                    "price_at_time": item.price,
                })
            })
            .collect();
        self.store.insert("order_items", Value::Array(lines)).await?;

        Ok(order)
    }
}
