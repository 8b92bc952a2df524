//! Data-access core for a family of storefront apps (buyer, B2B sales
//! agent, admin): product catalog reads, cart lifecycle, cart-to-order
//! conversion, and order queries over a PostgREST-style hosted backend.
//!
//! All state lives in the remote store. Construct one
//! [`PostgrestGateway`] from a [`StoreConfig`] and inject it into each
//! service:
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_core::{CartService, CheckoutService, PostgrestGateway, StoreConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::from_env()?;
//! let store = Arc::new(PostgrestGateway::new(&config)?);
//! let carts = CartService::new(Arc::clone(&store));
//! let checkout = CheckoutService::new(store);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod store;

pub use application::{AccountService, CartService, CatalogService, CheckoutService, OrderService};
pub use config::StoreConfig;
pub use domain::errors::StorefrontError;
pub use domain::order::OrderStatus;
pub use store::postgrest::PostgrestGateway;
pub use store::{StoreError, StoreGateway};
