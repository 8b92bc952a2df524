//! Domain entities and the error taxonomy shared by every service.

pub mod account;
pub mod cart;
pub mod errors;
pub mod order;
pub mod product;

pub use account::{Membership, Profile};
pub use cart::{Cart, CartItem};
pub use errors::StorefrontError;
pub use order::{Order, OrderItem, OrderItemInput, OrderStatus};
pub use product::{Category, Product, ProductQuery, ProductStatus};
