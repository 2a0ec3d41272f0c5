// artisan_market/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::services::access_guard;
use crate::state::AppState;
use crate::store::Store;
use crate::web::extractors::{AuthenticatedUser, SellerUser};

async fn load_product(store: &dyn Store, product_id: Uuid) -> Result<Product, AppError> {
  store.find_product(product_id).await?.ok_or_else(|| {
    warn!("Product with ID {} not found.", product_id);
    AppError::NotFound("Product not found.".to_string())
  })
}

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProductFilter>,
) -> Result<HttpResponse, AppError> {
  let filter = query_params.into_inner().normalized();
  let products = app_state.store.list_products(&filter).await?;
  info!(
    keyword = ?filter.keyword,
    category = ?filter.category,
    "Fetched {} products.",
    products.len()
  );

  Ok(HttpResponse::Ok().json(json!({
      "message": "Products fetched successfully.",
      "products": products
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = load_product(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Product fetched successfully.",
      "product": product
  })))
}

/// Sellers may list only their own products; admins may list anyone's.
#[instrument(
    name = "handler::list_seller_products",
    skip(app_state, path, auth_user),
    fields(seller_id = %path.as_ref(), user_id = %auth_user.user.id)
)]
pub async fn list_seller_products_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: SellerUser,
) -> Result<HttpResponse, AppError> {
  let seller_id = path.into_inner();
  access_guard::require_owner_or_admin(&auth_user.user, seller_id)?;

  let products = app_state.store.list_products_by_seller(seller_id).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Seller products fetched successfully.",
      "products": products
  })))
}

#[instrument(
    name = "handler::create_product",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user.id, name = %req_payload.name)
)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewProduct>,
  auth_user: SellerUser,
) -> Result<HttpResponse, AppError> {
  let new_product = req_payload.into_inner();
  new_product.validate()?;

  let product = app_state
    .store
    .insert_product(new_product.into_product(auth_user.user.id))
    .await?;
  info!(product_id = %product.id, "Product created.");

  Ok(HttpResponse::Created().json(json!({
      "message": "Product created successfully.",
      "product": product
  })))
}

#[instrument(
    name = "handler::update_product",
    skip(app_state, path, req_payload, auth_user),
    fields(product_id = %path.as_ref(), user_id = %auth_user.user.id)
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProductUpdate>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let update = req_payload.into_inner();
  update.validate()?;

  let mut product = load_product(app_state.store.as_ref(), path.into_inner()).await?;
  access_guard::require_owner_or_admin(&auth_user.user, product.seller_id)?;

  update.apply_to(&mut product);
  let product = app_state
    .store
    .update_product(&product)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;
  info!("Product updated.");

  Ok(HttpResponse::Ok().json(json!({
      "message": "Product updated successfully.",
      "product": product
  })))
}

#[instrument(
    name = "handler::delete_product",
    skip(app_state, path, auth_user),
    fields(product_id = %path.as_ref(), user_id = %auth_user.user.id)
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product = load_product(app_state.store.as_ref(), path.into_inner()).await?;
  access_guard::require_owner_or_admin(&auth_user.user, product.seller_id)?;

  if !app_state.store.delete_product(product.id).await? {
    return Err(AppError::NotFound("Product not found.".to_string()));
  }
  info!("Product removed.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Product removed." })))
}
