// artisan_market/src/services/access_guard.rs

//! Identity resolution and the role/ownership checks layered on top of it.
//!
//! Identity failures are 401. Role and ownership failures are 403.

use crate::errors::{AppError, Result};
use crate::models::user::{Role, User};
use crate::services::token_service::TokenService;
use crate::store::Store;
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use tracing::{instrument, warn};
use uuid::Uuid;

/// Header older clients send the raw token in.
pub const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// `Authorization: Bearer <token>` first, then the legacy header.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
  let bearer = headers
    .get(AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
    .map(str::trim);
  bearer
    .or_else(|| headers.get(LEGACY_TOKEN_HEADER).and_then(|v| v.to_str().ok()).map(str::trim))
    .filter(|t| !t.is_empty())
}

/// Verifies `token` and loads its user. A valid token for a deleted user is
/// rejected like any other bad token.
#[instrument(name = "access_guard::resolve_identity", skip_all, err(Display))]
pub async fn resolve_identity(store: &dyn Store, tokens: &TokenService, token: Option<&str>) -> Result<User> {
  let token = token.ok_or_else(|| AppError::Auth("No token, authorization denied.".to_string()))?;
  let claims = tokens.verify(token)?;
  match store.find_user_by_id(claims.sub).await? {
    Some(user) => Ok(user),
    None => {
      warn!(user_id = %claims.sub, "Token is valid, but user no longer exists.");
      Err(AppError::Auth("Token is not valid.".to_string()))
    }
  }
}

pub fn require_role(user: &User, allowed: &[Role]) -> Result<()> {
  if allowed.contains(&user.role) {
    return Ok(());
  }
  warn!(user_id = %user.id, role = %user.role, "Role check failed.");
  Err(AppError::Forbidden(format!("Role '{}' is not allowed to do this.", user.role)))
}

pub fn require_seller_or_admin(user: &User) -> Result<()> {
  require_role(user, &[Role::Seller, Role::Admin])
}

pub fn require_admin(user: &User) -> Result<()> {
  require_role(user, &[Role::Admin]).map_err(|_| AppError::Forbidden("Not authorized as an admin.".to_string()))
}

pub fn is_owner_or_admin(user: &User, owner_id: Uuid) -> bool {
  user.role == Role::Admin || user.id == owner_id
}

pub fn require_owner_or_admin(user: &User, owner_id: Uuid) -> Result<()> {
  if is_owner_or_admin(user, owner_id) {
    Ok(())
  } else {
    warn!(user_id = %user.id, %owner_id, "Ownership check failed.");
    Err(AppError::Forbidden("User not authorized for this resource.".to_string()))
  }
}
