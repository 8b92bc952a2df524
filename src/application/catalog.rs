use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::{decode, decode_rows};
use crate::domain::errors::StorefrontError;
use crate::domain::product::{Category, Product, ProductQuery};
use crate::store::query::Query;
use crate::store::StoreGateway;

/// Read-only catalog queries, always scoped to one seller organization.
pub struct CatalogService<G> {
    store: Arc<G>,
}

impl<G: StoreGateway> CatalogService<G> {
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    /// List products for a business with optional category, status, and
    /// free-text filters. Search matches name or description,
    /// case-insensitively. Pages are 1-based; `per_page` is clamped to 100.
    pub async fn list_products(&self, params: &ProductQuery) -> Result<Vec<Product>, StorefrontError> {
        let page = params.page.max(1);
        let per_page = params.per_page.clamp(1, 100);
        let start = ((page - 1) * per_page) as usize;
        let end = start + per_page as usize - 1;

        let mut query = Query::new()
            .eq("business_id", json!(params.business_id))
            .order("created_at", false)
            .range(start, end);
        if let Some(category_id) = params.category_id {
            query = query.eq("category_id", json!(category_id));
        }
        if let Some(status) = params.status {
            query = query.eq("status", json!(status));
        }
        if let Some(term) = params.search.as_deref() {
            let term = term.trim();
            if !term.is_empty() {
                let pattern = format!("*{term}*");
                query = query.or_ilike(&[("name", &pattern), ("description", &pattern)]);
            }
        }

        decode_rows(self.store.select("products", query).await?)
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, StorefrontError> {
        let row = self
            .store
            .select_maybe("products", Query::new().eq("id", json!(product_id)))
            .await?
            .ok_or(StorefrontError::NotFound("product"))?;
        decode(row)
    }

    pub async fn list_categories(&self, business_id: Uuid) -> Result<Vec<Category>, StorefrontError> {
        let query = Query::new()
            .eq("business_id", json!(business_id))
            .order("name", true);
        decode_rows(self.store.select("categories", query).await?)
    }
}
