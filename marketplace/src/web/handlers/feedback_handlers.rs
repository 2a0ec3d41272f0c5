// artisan_market/src/web/handlers/feedback_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::feedback::NewFeedback;
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};

#[instrument(name = "handler::submit_feedback", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn submit_feedback_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewFeedback>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let feedback = req_payload.into_inner().into_feedback(&auth_user.user)?;
  let feedback = app_state.store.insert_feedback(feedback).await?;
  info!(feedback_id = %feedback.id, "Feedback submitted.");
  Ok(HttpResponse::Created().json(json!({
      "message": "Feedback submitted successfully.",
      "feedback": feedback,
  })))
}

#[instrument(name = "handler::list_feedback", skip(app_state, admin), fields(admin_id = %admin.user.id))]
pub async fn list_feedback_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let feedback = app_state.store.list_feedback().await?;
  Ok(HttpResponse::Ok().json(feedback))
}
