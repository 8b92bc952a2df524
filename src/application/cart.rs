use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{decode, decode_rows, first_row};
use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::StorefrontError;
use crate::store::query::Query;
use crate::store::StoreGateway;

/// Cart lifecycle: get-or-create, merge-add of line items, quantity
/// updates, removal, and joined listing.
pub struct CartService<G> {
    store: Arc<G>,
}

impl<G: StoreGateway> CartService<G> {
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    /// Idempotently resolve the single cart for a `(user, business)` pair,
    /// creating it if absent. A single upsert keyed on the composite pair,
    /// so concurrent calls cannot produce duplicate carts.
    pub async fn get_or_create_cart(
        &self,
        user_id: Uuid,
        business_id: Uuid,
    ) -> Result<Cart, StorefrontError> {
        let row = self
            .store
            .upsert(
                "carts",
                json!({ "user_id": user_id, "business_id": business_id }),
                "user_id,business_id",
            )
            .await?;
        decode(row)
    }

    /// Add a product to a cart, or merge into the existing line.
    ///
    /// When the `(cart, product)` line already exists, the given quantity is
    /// added to the stored one and the stored price snapshot is kept
    /// (first-write-wins). A no-rows lookup is the insert path, not an
    /// error. The check-then-act pair is not atomic; concurrent adds for the
    /// same product can race, which the backend's composite uniqueness has
    /// to absorb.
    pub async fn add_or_update_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<CartItem, StorefrontError> {
        if quantity <= 0 {
            return Err(StorefrontError::Validation(format!(
                "quantity must be positive, got {quantity}"
            )));
        }

        let lookup = Query::new()
            .eq("cart_id", json!(cart_id))
            .eq("product_id", json!(product_id));
        match self.store.select_maybe("cart_items", lookup).await? {
            Some(row) => {
                let existing: CartItem = decode(row)?;
                let rows = self
                    .store
                    .update(
                        "cart_items",
                        Query::new().eq("id", json!(existing.id)),
                        json!({
                            "quantity": existing.quantity + quantity,
                            "updated_at": Utc::now(),
                        }),
                    )
                    .await?;
                decode(rows.into_iter().next().ok_or(StorefrontError::NotFound("cart item"))?)
            }
            None => {
                let rows = self
                    .store
                    .insert(
                        "cart_items",
                        json!({
                            "cart_id": cart_id,
                            "product_id": product_id,
                            "quantity": quantity,
                            "price": price,
                        }),
                    )
                    .await?;
                decode(first_row(rows)?)
            }
        }
    }

    /// Set a line's quantity. Zero or negative means removal; quantity is
    /// never persisted at or below zero. Returns `None` when the line was
    /// removed.
    pub async fn update_item_quantity(
        &self,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItem>, StorefrontError> {
        if quantity <= 0 {
            self.remove_item(cart_item_id).await?;
            return Ok(None);
        }
        let rows = self
            .store
            .update(
                "cart_items",
                Query::new().eq("id", json!(cart_item_id)),
                json!({ "quantity": quantity, "updated_at": Utc::now() }),
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(StorefrontError::NotFound("cart item"))?;
        Ok(Some(decode(row)?))
    }

    /// Delete a line by id. Deleting an absent id is success.
    pub async fn remove_item(&self, cart_item_id: Uuid) -> Result<(), StorefrontError> {
        self.store
            .delete("cart_items", Query::new().eq("id", json!(cart_item_id)))
            .await?;
        Ok(())
    }

    /// List a cart's lines with the live joined product. Takes the raw
    /// route-segment identifier the UI holds and rejects malformed ids
    /// before any store call.
    pub async fn items(&self, cart_id: &str) -> Result<Vec<CartItem>, StorefrontError> {
        let cart_id = Uuid::parse_str(cart_id).map_err(|_| {
            StorefrontError::Validation(format!("malformed cart id: {cart_id:?}"))
        })?;
        let query = Query::new()
            .select("*, product:products(*)")
            .eq("cart_id", json!(cart_id));
        decode_rows(self.store.select("cart_items", query).await?)
    }
}
