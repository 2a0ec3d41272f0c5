// artisan_market/src/models/order.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use uuid::Uuid;

/// Informational only; any status may be set from any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
  #[default]
  Processing,
  Shipped,
  Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub product_id: Uuid,
  pub name: String,
  #[serde(default)]
  pub image_url: String,
  pub price_cents: i64,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub address: String,
  pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub order_items: Vec<OrderLine>,
  pub shipping_address: ShippingAddress,
  pub payment_method: String,
  pub tax_price_cents: i64,
  pub shipping_price_cents: i64,
  pub total_price_cents: i64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}

/// Checkout payload. Totals are taken as sent by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
  #[serde(default)]
  pub order_items: Vec<OrderLine>,
  pub shipping_address: ShippingAddress,
  pub payment_method: String,
  #[serde(default)]
  pub tax_price_cents: i64,
  #[serde(default)]
  pub shipping_price_cents: i64,
  pub total_price_cents: i64,
}

impl NewOrder {
  pub fn validate(&self) -> Result<()> {
    if self.order_items.is_empty() {
      return Err(AppError::Validation("No order items.".to_string()));
    }
    if self.order_items.iter().any(|l| l.quantity < 1) {
      return Err(AppError::Validation("Order item quantities must be at least 1.".to_string()));
    }
    Ok(())
  }

  pub fn into_order(self, user_id: Uuid) -> Order {
    Order {
      id: Uuid::new_v4(),
      user_id,
      order_items: self.order_items,
      shipping_address: self.shipping_address,
      payment_method: self.payment_method,
      tax_price_cents: self.tax_price_cents,
      shipping_price_cents: self.shipping_price_cents,
      total_price_cents: self.total_price_cents,
      status: OrderStatus::Processing,
      created_at: Utc::now(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
  pub status: OrderStatus,
}
