// artisan_market/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::review::NewReview;
use crate::pipelines::contexts::AddReviewCtxData;
use crate::pipelines::run_to_completion;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use craftflow::FlowContext;

#[instrument(
    name = "handler::add_review",
    skip(app_state, path, req_payload, auth_user),
    fields(product_id = %path.as_ref(), user_id = %auth_user.user.id, rating = req_payload.rating)
)]
pub async fn add_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<NewReview>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let NewReview { rating, comment } = req_payload.into_inner();
  let review_ctx = FlowContext::new(AddReviewCtxData {
    app_state: app_state.get_ref().clone(),
    reviewer: auth_user.user,
    product_id: path.into_inner(),
    rating,
    comment,
    product: None,
    review: None,
    updated_product: None,
  });

  run_to_completion(&app_state.flows, review_ctx.clone(), "Add review").await?;

  let (review, product) = {
    let guard = review_ctx.read();
    (guard.review.clone(), guard.updated_product.clone())
  };
  let review = review.ok_or_else(|| AppError::Internal("Review flow completed without a review.".to_string()))?;
  info!(review_id = %review.id, "Review added.");

  Ok(HttpResponse::Created().json(json!({
      "message": "Review added successfully.",
      "review": review,
      "rating": product.as_ref().map(|p| p.rating),
      "numReviews": product.as_ref().map(|p| p.num_reviews),
  })))
}

#[instrument(name = "handler::list_reviews", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn list_reviews_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let reviews = app_state.store.list_reviews(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(reviews))
}
