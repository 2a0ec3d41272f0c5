// artisan_market/src/models/wishlist.rs

use crate::errors::{AppError, Result};
use crate::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A free-text wish, not tied to any catalog product.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
  pub id: Uuid,
  pub user_id: Uuid,
  pub user_name: String,
  pub user_email: String,
  pub product_name: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlistEntry {
  #[serde(default)]
  pub product_name: String,
}

impl NewWishlistEntry {
  pub fn into_entry(self, owner: &User) -> Result<WishlistEntry> {
    let product_name = self.product_name.trim();
    if product_name.is_empty() {
      return Err(AppError::Validation("Product name is required.".to_string()));
    }
    Ok(WishlistEntry {
      id: Uuid::new_v4(),
      user_id: owner.id,
      user_name: owner.name.clone(),
      user_email: owner.email.clone(),
      product_name: product_name.to_string(),
      created_at: Utc::now(),
    })
  }
}
