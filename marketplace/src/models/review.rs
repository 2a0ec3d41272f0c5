// artisan_market/src/models/review.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id: Uuid,
  pub product_id: Uuid,
  pub user_id: Uuid,
  /// Reviewer display name at the time of writing.
  pub name: String,
  pub rating: i32,
  pub comment: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
  pub rating: i32,
  #[serde(default)]
  pub comment: String,
}

impl NewReview {
  pub fn validate(&self) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
      return Err(AppError::Validation(format!(
        "Rating must be between {} and {}.",
        MIN_RATING, MAX_RATING
      )));
    }
    Ok(())
  }
}

/// The denormalized rating fields stored on a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
  pub rating: f64,
  pub num_reviews: i32,
}

impl RatingSummary {
  /// Full recomputation over every review of one product.
  pub fn from_ratings<I: IntoIterator<Item = i32>>(ratings: I) -> Self {
    let (sum, count) = ratings
      .into_iter()
      .fold((0i64, 0i32), |(sum, count), r| (sum + i64::from(r), count + 1));
    let rating = if count == 0 { 0.0 } else { sum as f64 / f64::from(count) };
    Self {
      rating,
      num_reviews: count,
    }
  }
}
