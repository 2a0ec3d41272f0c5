// artisan_market/src/models/product.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Upper bound on a listed price (10,000,000.00). Keeps `price * i32::MAX`
/// inside `i64` so cart totals never overflow.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub image_url: String,
  pub category: String,
  pub seller_id: Uuid,
  /// Mean of all review ratings; 0 until the first review.
  pub rating: f64,
  pub num_reviews: i32,
  pub count_in_stock: i32,
  pub created_at: DateTime<Utc>,
}

/// Query-string filter for catalog listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
  pub keyword: Option<String>,
  pub category: Option<String>,
}

impl ProductFilter {
  /// Blank parameters are treated as absent.
  pub fn normalized(self) -> Self {
    let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    Self {
      keyword: clean(self.keyword),
      category: clean(self.category),
    }
  }

  /// Keyword: case-insensitive substring of the name. Category: exact.
  pub fn matches(&self, product: &Product) -> bool {
    let keyword_ok = self
      .keyword
      .as_ref()
      .map_or(true, |kw| product.name.to_lowercase().contains(&kw.to_lowercase()));
    let category_ok = self.category.as_ref().map_or(true, |c| &product.category == c);
    keyword_ok && category_ok
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub image_url: String,
  pub category: String,
  #[serde(default)]
  pub count_in_stock: i32,
}

impl NewProduct {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(AppError::Validation("Product name is required.".to_string()));
    }
    if self.description.trim().is_empty() {
      return Err(AppError::Validation("Product description is required.".to_string()));
    }
    if self.category.trim().is_empty() {
      return Err(AppError::Validation("Product category is required.".to_string()));
    }
    if self.image_url.trim().is_empty() {
      return Err(AppError::Validation("Product image is required.".to_string()));
    }
    validate_amounts(Some(self.price_cents), Some(self.count_in_stock))
  }

  pub fn into_product(self, seller_id: Uuid) -> Product {
    Product {
      id: Uuid::new_v4(),
      name: self.name.trim().to_string(),
      description: self.description,
      price_cents: self.price_cents,
      image_url: self.image_url,
      category: self.category.trim().to_string(),
      seller_id,
      rating: 0.0,
      num_reviews: 0,
      count_in_stock: self.count_in_stock,
      created_at: Utc::now(),
    }
  }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
  pub image_url: Option<String>,
  pub category: Option<String>,
  pub count_in_stock: Option<i32>,
}

impl ProductUpdate {
  pub fn validate(&self) -> Result<()> {
    if matches!(&self.name, Some(n) if n.trim().is_empty()) {
      return Err(AppError::Validation("Product name cannot be blank.".to_string()));
    }
    if matches!(&self.category, Some(c) if c.trim().is_empty()) {
      return Err(AppError::Validation("Product category cannot be blank.".to_string()));
    }
    validate_amounts(self.price_cents, self.count_in_stock)
  }

  /// Rating, review count, owner and creation time are not editable here.
  pub fn apply_to(self, product: &mut Product) {
    if let Some(name) = self.name {
      product.name = name.trim().to_string();
    }
    if let Some(description) = self.description {
      product.description = description;
    }
    if let Some(price_cents) = self.price_cents {
      product.price_cents = price_cents;
    }
    if let Some(image_url) = self.image_url {
      product.image_url = image_url;
    }
    if let Some(category) = self.category {
      product.category = category.trim().to_string();
    }
    if let Some(count_in_stock) = self.count_in_stock {
      product.count_in_stock = count_in_stock;
    }
  }
}

fn validate_amounts(price_cents: Option<i64>, count_in_stock: Option<i32>) -> Result<()> {
  if matches!(price_cents, Some(p) if p < 0) {
    return Err(AppError::Validation("Price cannot be negative.".to_string()));
  }
  if matches!(price_cents, Some(p) if p > MAX_PRICE_CENTS) {
    return Err(AppError::Validation(format!(
      "Price cannot exceed {} cents.",
      MAX_PRICE_CENTS
    )));
  }
  if matches!(count_in_stock, Some(c) if c < 0) {
    return Err(AppError::Validation("Stock count cannot be negative.".to_string()));
  }
  Ok(())
}
