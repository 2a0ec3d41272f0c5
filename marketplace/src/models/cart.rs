// artisan_market/src/models/cart.rs

use crate::errors::{AppError, Result};
use crate::models::product::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cart line. Name, image and price are copied from the product when the
/// line is first added and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub product_id: Uuid,
  pub name: String,
  pub image_url: String,
  pub price_cents: i64,
  pub quantity: i32,
}

impl CartLine {
  /// Saturates instead of overflowing; stored rows may predate price limits.
  pub fn line_total_cents(&self) -> i64 {
    self.price_cents.saturating_mul(i64::from(self.quantity))
  }
}

/// One cart per user. Invariant: at most one line per product, every quantity >= 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Uuid,
  pub items: Vec<CartLine>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn empty(user_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      items: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
    self.items.iter().find(|l| l.product_id == product_id)
  }

  /// Increments the existing line for `product` or appends a new one.
  /// Returns the resulting line. A merged quantity past `i32::MAX` is rejected
  /// and leaves the cart untouched.
  pub fn add_line(&mut self, product: &Product, quantity: i32) -> Result<&CartLine> {
    if quantity < 1 {
      return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }
    let idx = match self.items.iter().position(|l| l.product_id == product.id) {
      Some(idx) => {
        let line = &mut self.items[idx];
        line.quantity = line
          .quantity
          .checked_add(quantity)
          .ok_or_else(|| AppError::Validation("Cart quantity is too large.".to_string()))?;
        idx
      }
      None => {
        self.items.push(CartLine {
          product_id: product.id,
          name: product.name.clone(),
          image_url: product.image_url.clone(),
          price_cents: product.price_cents,
          quantity,
        });
        self.items.len() - 1
      }
    };
    Ok(&self.items[idx])
  }

  /// A quantity of zero or less removes the line.
  pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) -> Result<()> {
    let idx = self
      .items
      .iter()
      .position(|l| l.product_id == product_id)
      .ok_or_else(|| AppError::NotFound("Item not found in cart.".to_string()))?;
    if quantity <= 0 {
      self.items.remove(idx);
    } else {
      self.items[idx].quantity = quantity;
    }
    Ok(())
  }

  pub fn remove_line(&mut self, product_id: Uuid) -> Result<()> {
    let before = self.items.len();
    self.items.retain(|l| l.product_id != product_id);
    if self.items.len() == before {
      return Err(AppError::NotFound("Item not found in cart.".to_string()));
    }
    Ok(())
  }

  pub fn subtotal_cents(&self) -> i64 {
    self
      .items
      .iter()
      .map(CartLine::line_total_cents)
      .fold(0i64, i64::saturating_add)
  }

  pub fn item_count(&self) -> i64 {
    self
      .items
      .iter()
      .map(|l| i64::from(l.quantity))
      .fold(0i64, i64::saturating_add)
  }
}
