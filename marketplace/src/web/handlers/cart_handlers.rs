// artisan_market/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Cart;
use crate::pipelines::contexts::{AddToCartCtxData, CartMutation, CartMutationCtxData};
use crate::pipelines::run_to_completion;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use craftflow::FlowContext;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

fn cart_body(message: &str, cart: &Cart) -> Value {
  json!({
      "message": message,
      "cart": cart,
      "subtotalCents": cart.subtotal_cents(),
      "itemCount": cart.item_count(),
  })
}

fn saved_cart(saved: Option<Cart>) -> Result<Cart, AppError> {
  saved.ok_or_else(|| AppError::Internal("Cart flow completed without a saved cart.".to_string()))
}

/// Fetch-or-create: a caller without a cart gets a new empty one persisted.
#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user_id = auth_user.user.id;
  let cart = match app_state.store.find_cart(user_id).await? {
    Some(cart) => cart,
    None => {
      info!("No cart yet, creating an empty one.");
      app_state.store.save_cart(&Cart::empty(user_id)).await?
    }
  };
  Ok(HttpResponse::Ok().json(cart_body("Cart fetched successfully.", &cart)))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user.id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let add_ctx = FlowContext::new(AddToCartCtxData {
    app_state: app_state.get_ref().clone(),
    authenticated_user_id: auth_user.user.id,
    product_id: req_payload.product_id,
    quantity: req_payload.quantity,
    product: None,
    cart: None,
    cart_created: false,
    saved_cart: None,
  });

  run_to_completion(&app_state.flows, add_ctx.clone(), "Add to cart").await?;

  let (saved, created) = {
    let guard = add_ctx.read();
    (guard.saved_cart.clone(), guard.cart_created)
  };
  let cart = saved_cart(saved)?;
  info!(cart_created = created, lines = cart.items.len(), "Add to cart successful.");
  Ok(HttpResponse::Ok().json(cart_body("Item added to cart successfully.", &cart)))
}

async fn run_cart_mutation(
  app_state: &web::Data<AppState>,
  user_id: Uuid,
  mutation: CartMutation,
) -> Result<Cart, AppError> {
  let mutation_ctx = FlowContext::new(CartMutationCtxData {
    app_state: app_state.get_ref().clone(),
    authenticated_user_id: user_id,
    mutation,
    cart: None,
    saved_cart: None,
  });
  run_to_completion(&app_state.flows, mutation_ctx.clone(), "Cart update").await?;
  let saved = mutation_ctx.read().saved_cart.clone();
  saved_cart(saved)
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user.id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UpdateCartItemPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mutation = CartMutation::SetQuantity {
    product_id: req_payload.product_id,
    quantity: req_payload.quantity,
  };
  let cart = run_cart_mutation(&app_state, auth_user.user.id, mutation).await?;
  Ok(HttpResponse::Ok().json(cart_body("Cart updated successfully.", &cart)))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user.id, product_id = %path.as_ref())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mutation = CartMutation::Remove {
    product_id: path.into_inner(),
  };
  let cart = run_cart_mutation(&app_state, auth_user.user.id, mutation).await?;
  Ok(HttpResponse::Ok().json(cart_body("Item removed from cart.", &cart)))
}
