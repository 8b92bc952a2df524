use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Catalog publication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Published,
    Rejected,
}

/// A catalog product. Read-only from this crate's perspective; carts and
/// orders snapshot `price` rather than dereferencing it later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub business_id: Uuid,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: BigDecimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog listing parameters, always scoped to one seller organization.
#[derive(Debug, Clone)]
pub struct ProductQuery {
    pub business_id: Uuid,
    pub category_id: Option<Uuid>,
    /// Free-text term matched case-insensitively against name and
    /// description.
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
    /// 1-based page number.
    pub page: i64,
    pub per_page: i64,
}

impl ProductQuery {
    pub fn for_business(business_id: Uuid) -> Self {
        Self {
            business_id,
            category_id: None,
            search: None,
            status: None,
            page: 1,
            per_page: 20,
        }
    }
}

/// Normalize the shape a joined product arrives in. Depending on how the
/// backend resolves the embedding, the field may be a single object, a
/// one-element array, or null (e.g. the product was deleted since the item
/// was added); callers always see `Option<Product>`.
pub(crate) fn deserialize_joined<'de, D>(deserializer: D) -> Result<Option<Product>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::Array(mut rows) => {
            if rows.is_empty() {
                Ok(None)
            } else {
                serde_json::from_value(rows.swap_remove(0))
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
        object => serde_json::from_value(object)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
