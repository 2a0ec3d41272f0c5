// artisan_market/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[instrument(name = "handler::list_users", skip(app_state, admin), fields(admin_id = %admin.user.id))]
pub async fn list_users_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let users = app_state.store.list_users().await?;
  Ok(HttpResponse::Ok().json(users))
}

#[instrument(
    name = "handler::delete_user",
    skip(app_state, path, admin),
    fields(target_id = %path.as_ref(), admin_id = %admin.user.id)
)]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let target_id = path.into_inner();
  if app_state.store.find_user_by_id(target_id).await?.is_none() {
    return Err(AppError::NotFound("User not found.".to_string()));
  }
  if target_id == admin.user.id {
    warn!("Admin attempted to delete their own account.");
    return Err(AppError::Validation("Cannot delete own admin account.".to_string()));
  }

  app_state.store.delete_user(target_id).await?;
  info!("User removed.");
  Ok(HttpResponse::Ok().json(json!({ "message": "User removed." })))
}
