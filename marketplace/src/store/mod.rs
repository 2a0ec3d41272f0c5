// artisan_market/src/store/mod.rs

//! Persistence seam. Handlers and flows only talk to `dyn Store`.
//!
//! Carts and orders are whole documents: every mutation rewrites the full
//! document and the last write wins. Nothing here spans more than one
//! document in a transaction.

pub mod memory;
pub mod postgres;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::review::RatingSummary;
use crate::models::{
  Cart, Feedback, NewUser, Order, OrderStatus, Product, ProductFilter, Review, Role, User, WishlistEntry,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
  // --- users ---
  async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
  /// `email` must already be normalized.
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
  /// Fails with a validation error when the email is taken.
  async fn insert_user(&self, new_user: NewUser) -> Result<User>;
  async fn list_users(&self) -> Result<Vec<User>>;
  async fn first_user_with_role(&self, role: Role) -> Result<Option<User>>;
  async fn delete_user(&self, id: Uuid) -> Result<bool>;

  // --- catalog ---
  /// Newest first.
  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
  async fn list_products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>>;
  async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;
  async fn insert_product(&self, product: Product) -> Result<Product>;
  /// Writes the editable fields of `product`; returns `None` if it no longer exists.
  async fn update_product(&self, product: &Product) -> Result<Option<Product>>;
  async fn set_product_rating(&self, id: Uuid, summary: RatingSummary) -> Result<Option<Product>>;
  async fn delete_product(&self, id: Uuid) -> Result<bool>;
  /// Deletes every product, then inserts `products`.
  async fn replace_catalog(&self, products: Vec<Product>) -> Result<usize>;

  // --- carts ---
  async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>>;
  /// Upserts by owner and refreshes `updated_at`.
  async fn save_cart(&self, cart: &Cart) -> Result<Cart>;
  async fn delete_cart(&self, user_id: Uuid) -> Result<bool>;

  // --- orders ---
  async fn insert_order(&self, order: Order) -> Result<Order>;
  /// Most recent first.
  async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;
  async fn find_order(&self, id: Uuid) -> Result<Option<Order>>;
  async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>>;

  // --- reviews ---
  async fn find_review_by_user(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>>;
  async fn insert_review(&self, review: Review) -> Result<Review>;
  /// Most recent first.
  async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>>;

  // --- wishlist ---
  async fn insert_wishlist_entry(&self, entry: WishlistEntry) -> Result<WishlistEntry>;
  async fn list_wishlist(&self) -> Result<Vec<WishlistEntry>>;
  async fn list_wishlist_for_user(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>>;
  async fn find_wishlist_entry(&self, id: Uuid) -> Result<Option<WishlistEntry>>;
  async fn delete_wishlist_entry(&self, id: Uuid) -> Result<bool>;

  // --- feedback ---
  async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback>;
  /// Most recent first.
  async fn list_feedback(&self) -> Result<Vec<Feedback>>;
}

/// Picks the backend named by `DATABASE_URL`. Postgres gets its schema
/// bootstrapped before the store is handed out.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn Store>> {
  if config.uses_memory_store() {
    tracing::warn!("Using the in-memory store; data is lost on shutdown.");
    return Ok(Arc::new(MemoryStore::new()));
  }
  let store = PgStore::connect(&config.database_url).await?;
  store.ensure_schema().await?;
  Ok(Arc::new(store))
}
