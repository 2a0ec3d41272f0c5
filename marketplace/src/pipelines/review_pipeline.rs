// artisan_market/src/pipelines/review_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::review::{NewReview, RatingSummary, Review};
use crate::pipelines::contexts::AddReviewCtxData;
use chrono::Utc;
use craftflow::{Flow, FlowContext, FlowRegistry, StepControl};
use tracing::{info, warn};
use uuid::Uuid;

/// One review per (product, user). The duplicate check and the insert are
/// separate store calls, so two racing submissions can both land.
pub fn register_add_review_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Flow::<AddReviewCtxData, AppError>::new(&[
    ("validate_rating", false, None),
    ("fetch_reviewed_product", false, None),
    ("reject_duplicate_review", false, None),
    ("persist_review", false, None),
    ("recompute_product_rating", false, None),
  ]);

  p.on("validate_rating", |ctx: FlowContext<AddReviewCtxData>| async move {
    let rating = ctx.read().rating;
    NewReview {
      rating,
      comment: String::new(),
    }
    .validate()?;
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("fetch_reviewed_product", |ctx: FlowContext<AddReviewCtxData>| async move {
    let (product_id, store) = {
      let guard = ctx.read();
      (guard.product_id, guard.app_state.store.clone())
    };
    let product = store.find_product(product_id).await?.ok_or_else(|| {
      warn!("Review for unknown product {}.", product_id);
      AppError::NotFound("Product not found.".to_string())
    })?;
    ctx.write().product = Some(product);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("reject_duplicate_review", |ctx: FlowContext<AddReviewCtxData>| async move {
    let (product_id, user_id, store) = {
      let guard = ctx.read();
      (guard.product_id, guard.reviewer.id, guard.app_state.store.clone())
    };
    if store.find_review_by_user(product_id, user_id).await?.is_some() {
      warn!("User {} already reviewed product {}.", user_id, product_id);
      return Err(AppError::Validation("Product already reviewed by this user.".to_string()));
    }
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("persist_review", persist_review);
  p.on("recompute_product_rating", recompute_product_rating);

  flows.register(p);
  info!("Add review flow registered.");
}

async fn persist_review(ctx: FlowContext<AddReviewCtxData>) -> Result<StepControl> {
  let (review, product_name, store) = {
    let guard = ctx.read();
    let product_name = guard.product.as_ref().map(|p| p.name.clone()).unwrap_or_default();
    let review = Review {
      id: Uuid::new_v4(),
      product_id: guard.product_id,
      user_id: guard.reviewer.id,
      name: guard.reviewer.name.clone(),
      rating: guard.rating,
      comment: guard.comment.trim().to_string(),
      created_at: Utc::now(),
    };
    (review, product_name, guard.app_state.store.clone())
  };

  let review = store.insert_review(review).await?;
  info!(%product_name, "Review {} stored for product {}.", review.id, review.product_id);
  ctx.write().review = Some(review);
  Ok(StepControl::Continue)
}

async fn recompute_product_rating(ctx: FlowContext<AddReviewCtxData>) -> Result<StepControl> {
  let (product_id, store) = {
    let guard = ctx.read();
    (guard.product_id, guard.app_state.store.clone())
  };

  let reviews = store.list_reviews(product_id).await?;
  let summary = RatingSummary::from_ratings(reviews.iter().map(|r| r.rating));
  let updated = store
    .set_product_rating(product_id, summary)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

  info!(
    "Product {} rating is now {:.2} over {} reviews.",
    product_id, summary.rating, summary.num_reviews
  );
  ctx.write().updated_product = Some(updated);
  Ok(StepControl::Continue)
}
