// artisan_market/src/store/memory.rs

//! In-process store behind `DATABASE_URL=memory://`, also used by the tests.
//!
//! Append-only collections keep insertion order so "most recent first" is
//! just a reverse walk.

use super::Store;
use crate::errors::{AppError, Result};
use crate::models::review::RatingSummary;
use crate::models::{
  Cart, Feedback, NewUser, Order, OrderStatus, Product, ProductFilter, Review, Role, User, WishlistEntry,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  users: Vec<User>,
  products: Vec<Product>,
  carts: HashMap<Uuid, Cart>,
  orders: Vec<Order>,
  reviews: Vec<Review>,
  wishlist: Vec<WishlistEntry>,
  feedback: Vec<Feedback>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn newest_first<T>(rows: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
  rows.rev().collect()
}

#[async_trait]
impl Store for MemoryStore {
  async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.email == email).cloned())
  }

  async fn insert_user(&self, new_user: NewUser) -> Result<User> {
    let mut tables = self.tables.write();
    if tables.users.iter().any(|u| u.email == new_user.email) {
      return Err(AppError::Validation("An account with this email already exists.".to_string()));
    }
    let user = new_user.into_user();
    tables.users.push(user.clone());
    Ok(user)
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    Ok(self.tables.read().users.clone())
  }

  async fn first_user_with_role(&self, role: Role) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.role == role).cloned())
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.users.len();
    tables.users.retain(|u| u.id != id);
    Ok(tables.users.len() != before)
  }

  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(newest_first(tables.products.iter().filter(|p| filter.matches(p)).cloned()))
  }

  async fn list_products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(newest_first(tables.products.iter().filter(|p| p.seller_id == seller_id).cloned()))
  }

  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.tables.read().products.iter().find(|p| p.id == id).cloned())
  }

  async fn insert_product(&self, product: Product) -> Result<Product> {
    self.tables.write().products.push(product.clone());
    Ok(product)
  }

  async fn update_product(&self, product: &Product) -> Result<Option<Product>> {
    let mut tables = self.tables.write();
    let Some(stored) = tables.products.iter_mut().find(|p| p.id == product.id) else {
      return Ok(None);
    };
    stored.name = product.name.clone();
    stored.description = product.description.clone();
    stored.price_cents = product.price_cents;
    stored.image_url = product.image_url.clone();
    stored.category = product.category.clone();
    stored.count_in_stock = product.count_in_stock;
    Ok(Some(stored.clone()))
  }

  async fn set_product_rating(&self, id: Uuid, summary: RatingSummary) -> Result<Option<Product>> {
    let mut tables = self.tables.write();
    Ok(tables.products.iter_mut().find(|p| p.id == id).map(|stored| {
      stored.rating = summary.rating;
      stored.num_reviews = summary.num_reviews;
      stored.clone()
    }))
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.products.len();
    tables.products.retain(|p| p.id != id);
    Ok(tables.products.len() != before)
  }

  async fn replace_catalog(&self, products: Vec<Product>) -> Result<usize> {
    let count = products.len();
    self.tables.write().products = products;
    Ok(count)
  }

  async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
    Ok(self.tables.read().carts.get(&user_id).cloned())
  }

  async fn save_cart(&self, cart: &Cart) -> Result<Cart> {
    let mut saved = cart.clone();
    saved.updated_at = Utc::now();
    let mut tables = self.tables.write();
    // First write for an owner fixes the cart's identity.
    if let Some(existing) = tables.carts.get(&cart.user_id) {
      saved.id = existing.id;
      saved.created_at = existing.created_at;
    }
    tables.carts.insert(saved.user_id, saved.clone());
    Ok(saved)
  }

  async fn delete_cart(&self, user_id: Uuid) -> Result<bool> {
    Ok(self.tables.write().carts.remove(&user_id).is_some())
  }

  async fn insert_order(&self, order: Order) -> Result<Order> {
    self.tables.write().orders.push(order.clone());
    Ok(order)
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(newest_first(tables.orders.iter().filter(|o| o.user_id == user_id).cloned()))
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    Ok(tables.orders.iter_mut().find(|o| o.id == id).map(|order| {
      order.status = status;
      order.clone()
    }))
  }

  async fn find_review_by_user(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
    let tables = self.tables.read();
    Ok(
      tables
        .reviews
        .iter()
        .find(|r| r.product_id == product_id && r.user_id == user_id)
        .cloned(),
    )
  }

  async fn insert_review(&self, review: Review) -> Result<Review> {
    self.tables.write().reviews.push(review.clone());
    Ok(review)
  }

  async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>> {
    let tables = self.tables.read();
    Ok(newest_first(tables.reviews.iter().filter(|r| r.product_id == product_id).cloned()))
  }

  async fn insert_wishlist_entry(&self, entry: WishlistEntry) -> Result<WishlistEntry> {
    self.tables.write().wishlist.push(entry.clone());
    Ok(entry)
  }

  async fn list_wishlist(&self) -> Result<Vec<WishlistEntry>> {
    Ok(newest_first(self.tables.read().wishlist.iter().cloned()))
  }

  async fn list_wishlist_for_user(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>> {
    let tables = self.tables.read();
    Ok(newest_first(tables.wishlist.iter().filter(|w| w.user_id == user_id).cloned()))
  }

  async fn find_wishlist_entry(&self, id: Uuid) -> Result<Option<WishlistEntry>> {
    Ok(self.tables.read().wishlist.iter().find(|w| w.id == id).cloned())
  }

  async fn delete_wishlist_entry(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.wishlist.len();
    tables.wishlist.retain(|w| w.id != id);
    Ok(tables.wishlist.len() != before)
  }

  async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback> {
    self.tables.write().feedback.push(feedback.clone());
    Ok(feedback)
  }

  async fn list_feedback(&self) -> Result<Vec<Feedback>> {
    Ok(newest_first(self.tables.read().feedback.iter().cloned()))
  }
}
