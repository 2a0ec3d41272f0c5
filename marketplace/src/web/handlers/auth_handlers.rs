// artisan_market/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::user::Role;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::pipelines::run_to_completion;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use craftflow::FlowContext;

// --- Request DTOs ---
#[derive(Deserialize)]
pub struct SignupRequestPayload {
  pub name: String,
  pub email: String,
  pub password: String,
  #[serde(default)]
  pub role: Role,
}

#[derive(Deserialize)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::signup",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email, role = %req_payload.role)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let req_payload = req_payload.into_inner();
  info!("Signup attempt.");

  let signup_ctx = FlowContext::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    name: req_payload.name,
    email: req_payload.email,
    password: req_payload.password,
    role: req_payload.role,
    created_user: None,
  });

  run_to_completion(&app_state.flows, signup_ctx.clone(), "Signup").await?;

  let user = signup_ctx.read().created_user.clone().ok_or_else(|| {
    warn!("Signup flow completed but no user was recorded in context.");
    AppError::Internal("Signup completed without creating a user.".to_string())
  })?;
  let token = app_state.tokens.issue(&user)?;

  info!(user_id = %user.id, "Signup successful.");
  Ok(HttpResponse::Created().json(json!({
      "message": "User created successfully.",
      "token": token,
      "user": user,
  })))
}

#[instrument(
    name = "handler::signin",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let req_payload = req_payload.into_inner();

  let signin_ctx = FlowContext::new(SigninCtxData {
    app_state: app_state.get_ref().clone(),
    email: req_payload.email,
    password: req_payload.password,
    user: None,
    session_token: None,
  });

  run_to_completion(&app_state.flows, signin_ctx.clone(), "Signin").await?;

  let (user, token) = {
    let guard = signin_ctx.read();
    (guard.user.clone(), guard.session_token.clone())
  };
  let user = user.ok_or_else(|| AppError::Auth("Signin completed without user identification.".to_string()))?;
  let token = token.ok_or_else(|| AppError::Auth("Signin completed without session token generation.".to_string()))?;

  info!(user_id = %user.id, "Signin successful.");
  Ok(HttpResponse::Ok().json(json!({
      "message": "Signin successful.",
      "token": token,
      "user": user,
  })))
}

#[instrument(name = "handler::me", skip(auth_user), fields(user_id = %auth_user.user.id))]
pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({ "user": auth_user.user })))
}
