// artisan_market/src/web/handlers/wishlist_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::wishlist::NewWishlistEntry;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::add_wishlist", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn add_wishlist_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewWishlistEntry>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let entry = req_payload.into_inner().into_entry(&auth_user.user)?;
  let item = app_state.store.insert_wishlist_entry(entry).await?;
  info!(entry_id = %item.id, "Wishlist entry added.");
  Ok(HttpResponse::Created().json(json!({
      "message": "Product added to wishlist.",
      "item": item,
  })))
}

#[instrument(name = "handler::all_wishlist", skip(app_state))]
pub async fn all_wishlist_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let items = app_state.store.list_wishlist().await?;
  Ok(HttpResponse::Ok().json(items))
}

#[instrument(name = "handler::my_wishlist", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn my_wishlist_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let items = app_state.store.list_wishlist_for_user(auth_user.user.id).await?;
  Ok(HttpResponse::Ok().json(items))
}

#[instrument(
    name = "handler::remove_wishlist",
    skip(app_state, path, auth_user),
    fields(entry_id = %path.as_ref(), user_id = %auth_user.user.id)
)]
pub async fn remove_wishlist_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let entry_id = path.into_inner();
  let entry = app_state
    .store
    .find_wishlist_entry(entry_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Wishlist item not found.".to_string()))?;

  if entry.user_id != auth_user.user.id {
    warn!("Wishlist entry {} removal attempted by a non-creator.", entry_id);
    return Err(AppError::Forbidden("User not authorized.".to_string()));
  }

  app_state.store.delete_wishlist_entry(entry_id).await?;
  info!("Wishlist entry removed.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Wishlist item removed." })))
}
