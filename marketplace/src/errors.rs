// artisan_market/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use craftflow::FlowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  /// Missing, malformed or expired identity.
  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// Valid identity, wrong role or not the owner.
  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(other) => AppError::Internal(other.to_string()),
      },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::Forbidden(m) | AppError::NotFound(m) => {
        HttpResponse::build(status).json(json!({ "error": m }))
      }
      // Server-side detail stays in the logs.
      _ => HttpResponse::build(status).json(json!({ "error": "An internal error occurred" })),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
