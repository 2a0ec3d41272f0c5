// artisan_market/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::order::{NewOrder, OrderStatusUpdate};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::pipelines::run_to_completion;
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};
use craftflow::FlowContext;

#[instrument(
    name = "handler::create_order",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user.id, items = req_payload.order_items.len())
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewOrder>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let checkout_ctx = FlowContext::new(CheckoutCtxData {
    app_state: app_state.get_ref().clone(),
    authenticated_user_id: auth_user.user.id,
    payload: Some(req_payload.into_inner()),
    order: None,
    cart_cleared: false,
  });

  run_to_completion(&app_state.flows, checkout_ctx.clone(), "Checkout").await?;

  let (order, cart_cleared) = {
    let guard = checkout_ctx.read();
    (guard.order.clone(), guard.cart_cleared)
  };
  let order = order.ok_or_else(|| AppError::Internal("Checkout completed without an order.".to_string()))?;
  info!(order_id = %order.id, cart_cleared, "Checkout successful.");
  Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::my_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.list_orders_for_user(auth_user.user.id).await?;
  Ok(HttpResponse::Ok().json(orders))
}

/// Someone else's order is reported as missing, not forbidden.
#[instrument(
    name = "handler::get_order",
    skip(app_state, path, auth_user),
    fields(order_id = %path.as_ref(), user_id = %auth_user.user.id)
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  match app_state.store.find_order(order_id).await? {
    Some(order) if order.user_id == auth_user.user.id => Ok(HttpResponse::Ok().json(order)),
    Some(_) => {
      warn!("Order {} requested by a non-owner.", order_id);
      Err(AppError::NotFound("Order not found.".to_string()))
    }
    None => Err(AppError::NotFound("Order not found.".to_string())),
  }
}

#[instrument(
    name = "handler::update_order_status",
    skip(app_state, path, req_payload, admin),
    fields(order_id = %path.as_ref(), status = ?req_payload.status, admin_id = %admin.user.id)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<OrderStatusUpdate>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .store
    .update_order_status(path.into_inner(), req_payload.status)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;
  info!("Order status updated.");
  Ok(HttpResponse::Ok().json(order))
}
