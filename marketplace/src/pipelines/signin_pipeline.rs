// artisan_market/src/pipelines/signin_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::user::normalize_email;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use craftflow::{Flow, FlowContext, FlowRegistry, StepControl};
use tracing::{info, warn};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

pub fn register_signin_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Flow::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email", false, None),
    ("verify_password", false, None),
    ("issue_session_token", false, None),
  ]);

  p.on("validate_signin_input", |ctx: FlowContext<SigninCtxData>| async move {
    let (email, password_empty) = {
      let guard = ctx.read();
      (normalize_email(&guard.email), guard.password.is_empty())
    };
    if email.is_empty() || password_empty {
      return Err(AppError::Validation("Email and password are required.".to_string()));
    }
    ctx.write().email = email;
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("fetch_user_by_email", fetch_user_by_email);
  p.on("verify_password", verify_signin_password);

  p.on("issue_session_token", |ctx: FlowContext<SigninCtxData>| async move {
    let (user, tokens) = {
      let guard = ctx.read();
      (guard.user.clone(), guard.app_state.tokens.clone())
    };
    let user = user.ok_or_else(|| AppError::Internal("Signin reached token issue without a user.".to_string()))?;
    let token = tokens.issue(&user)?;
    ctx.write().session_token = Some(token);
    info!(user_id = %user.id, "Session token issued.");
    Ok::<_, AppError>(StepControl::Continue)
  });

  flows.register(p);
  info!("Sign-in flow registered.");
}

async fn fetch_user_by_email(ctx: FlowContext<SigninCtxData>) -> Result<StepControl> {
  let (email, store) = {
    let guard = ctx.read();
    (guard.email.clone(), guard.app_state.store.clone())
  };
  match store.find_user_by_email(&email).await? {
    Some(user) => {
      ctx.write().user = Some(user);
      Ok(StepControl::Continue)
    }
    None => {
      warn!("Signin attempt for unknown email.");
      Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
    }
  }
}

async fn verify_signin_password(ctx: FlowContext<SigninCtxData>) -> Result<StepControl> {
  let (stored_hash, password) = {
    let guard = ctx.read();
    (
      guard.user.as_ref().map(|u| u.password_hash.clone()),
      guard.password.clone(),
    )
  };
  let stored_hash =
    stored_hash.ok_or_else(|| AppError::Internal("Signin reached verification without a user.".to_string()))?;

  if auth_service::verify_password(&stored_hash, &password)? {
    Ok(StepControl::Continue)
  } else {
    warn!("Signin attempt with wrong password.");
    Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
  }
}
