// artisan_market/src/models/feedback.rs

use crate::errors::{AppError, Result};
use crate::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
  pub id: Uuid,
  pub user_id: Uuid,
  pub name: String,
  pub email: String,
  pub message: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
  #[serde(default)]
  pub message: String,
}

impl NewFeedback {
  /// Name and email come from the submitting account, not the payload.
  pub fn into_feedback(self, author: &User) -> Result<Feedback> {
    let message = self.message.trim();
    if message.is_empty() {
      return Err(AppError::Validation("Feedback message is required.".to_string()));
    }
    Ok(Feedback {
      id: Uuid::new_v4(),
      user_id: author.id,
      name: author.name.clone(),
      email: author.email.clone(),
      message: message.to_string(),
      created_at: Utc::now(),
    })
  }
}
