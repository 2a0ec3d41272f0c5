// artisan_market/src/services/token_service.rs

//! Signed identity tokens (HS256 JWT).
//!
//! Tokens carry the user id and the role at issue time. The role claim is
//! informational: access checks read the role from the stored user.

use crate::errors::AppError;
use crate::models::user::{Role, User};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
  pub sub: Uuid,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
  encoding: Arc<EncodingKey>,
  decoding: Arc<DecodingKey>,
  ttl_secs: i64,
}

impl TokenService {
  pub fn new(secret: &str, ttl_secs: i64) -> Self {
    Self {
      encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
      decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
      ttl_secs,
    }
  }

  #[instrument(name = "token_service::issue", skip(self, user), fields(user_id = %user.id), err(Display))]
  pub fn issue(&self, user: &User) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
      sub: user.id,
      role: user.role,
      iat: now,
      exp: now + self.ttl_secs,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
      error!(error = %e, "Token signing failed.");
      AppError::Internal(format!("Token signing failed: {}", e))
    })
  }

  /// Any decode failure (bad signature, expired, malformed) is an auth error.
  #[instrument(name = "token_service::verify", skip_all)]
  pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    match decode::<Claims>(token, &self.decoding, &validation) {
      Ok(data) => {
        debug!(user_id = %data.claims.sub, "Token verified.");
        Ok(data.claims)
      }
      Err(e) => {
        warn!(reason = %e, "Token rejected.");
        Err(AppError::Auth("Token is not valid.".to_string()))
      }
    }
  }
}
