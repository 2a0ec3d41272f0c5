// artisan_market/src/pipelines/signup_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::user::{normalize_email, NewUser};
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service::{self, MIN_PASSWORD_LEN};
use craftflow::{Flow, FlowContext, FlowRegistry, StepControl};
use tracing::{event, info, warn, Level};

/// Registers the user sign-up flow.
pub fn register_signup_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Flow::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user_signup", false, None),
    ("create_user_in_db", false, None),
  ]);

  p.on("validate_signup_input", validate_signup_input);
  p.on("check_existing_user_signup", check_existing_user);
  p.on("create_user_in_db", create_user_in_db);

  flows.register(p);
  info!("Sign-up flow registered.");
}

async fn validate_signup_input(ctx: FlowContext<SignupCtxData>) -> Result<StepControl> {
  let (name, email, password_len, role) = {
    let guard = ctx.read();
    (
      guard.name.trim().to_string(),
      normalize_email(&guard.email),
      guard.password.len(),
      guard.role,
    )
  };

  event!(Level::DEBUG, %email, "Validating signup input.");
  if name.is_empty() {
    return Err(AppError::Validation("Name is required.".to_string()));
  }
  if email.is_empty() || !email.contains('@') {
    warn!("Invalid email format provided for signup.");
    return Err(AppError::Validation("Valid email is required.".to_string()));
  }
  if password_len < MIN_PASSWORD_LEN {
    warn!("Password too short for signup ({} chars).", password_len);
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  if !role.is_self_assignable() {
    warn!(%role, "Signup attempted with a reserved role.");
    return Err(AppError::Validation("Role must be buyer or seller.".to_string()));
  }

  {
    let mut guard = ctx.write();
    guard.name = name;
    guard.email = email;
  }
  Ok(StepControl::Continue)
}

async fn check_existing_user(ctx: FlowContext<SignupCtxData>) -> Result<StepControl> {
  let (email, store) = {
    let guard = ctx.read();
    (guard.email.clone(), guard.app_state.store.clone())
  };

  if store.find_user_by_email(&email).await?.is_some() {
    warn!("Attempt to signup with existing email: {}", email);
    return Err(AppError::Validation("An account with this email already exists.".to_string()));
  }
  info!("Email {} is available for signup.", email);
  Ok(StepControl::Continue)
}

async fn create_user_in_db(ctx: FlowContext<SignupCtxData>) -> Result<StepControl> {
  let (name, email, role, password, store) = {
    let guard = ctx.read();
    (
      guard.name.clone(),
      guard.email.clone(),
      guard.role,
      guard.password.clone(),
      guard.app_state.store.clone(),
    )
  };

  let password_hash = auth_service::hash_password(&password)?;
  let new_user = store
    .insert_user(NewUser {
      name,
      email,
      password_hash,
      role,
    })
    .await?;

  info!("User created successfully: ID={}, Role={}", new_user.id, new_user.role);
  ctx.write().created_user = Some(new_user);
  Ok(StepControl::Continue)
}
