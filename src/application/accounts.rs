use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{decode, decode_rows};
use crate::domain::account::{Membership, Profile};
use crate::domain::errors::StorefrontError;
use crate::store::query::Query;
use crate::store::StoreGateway;

/// Resolves profiles and the seller organizations a user acts for.
pub struct AccountService<G> {
    store: Arc<G>,
}

impl<G: StoreGateway> AccountService<G> {
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Profile, StorefrontError> {
        let row = self
            .store
            .select_maybe("profiles", Query::new().eq("id", json!(user_id)))
            .await?
            .ok_or(StorefrontError::NotFound("profile"))?;
        decode(row)
    }

    pub async fn memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, StorefrontError> {
        decode_rows(
            self.store
                .select("members", Query::new().eq("user_id", json!(user_id)))
                .await?,
        )
    }

    /// The ids of every seller organization the user is a member of.
    pub async fn business_ids_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, StorefrontError> {
        #[derive(Deserialize)]
        struct Row {
            business_id: Uuid,
        }
        let rows: Vec<Row> = decode_rows(
            self.store
                .select(
                    "members",
                    Query::new().select("business_id").eq("user_id", json!(user_id)),
                )
                .await?,
        )?;
        Ok(rows.into_iter().map(|r| r.business_id).collect())
    }
}
