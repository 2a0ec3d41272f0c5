// artisan_market/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Buyer,
  Seller,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Buyer => "buyer",
      Role::Seller => "seller",
      Role::Admin => "admin",
    }
  }

  /// Roles a visitor may pick for themselves at registration.
  pub fn is_self_assignable(&self) -> bool {
    matches!(self, Role::Buyer | Role::Seller)
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub role: Role,
  pub created_at: DateTime<Utc>,
}

/// A user row about to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub email: String,
  pub password_hash: String,
  pub role: Role,
}

impl NewUser {
  pub fn into_user(self) -> User {
    User {
      id: Uuid::new_v4(),
      name: self.name,
      email: self.email,
      password_hash: self.password_hash,
      role: self.role,
      created_at: Utc::now(),
    }
  }
}

/// Emails are compared case-insensitively; stored lowercased.
pub fn normalize_email(raw: &str) -> String {
  raw.trim().to_ascii_lowercase()
}
