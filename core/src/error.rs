// craftflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the engine itself, as opposed to failures returned by
/// step handlers. Application error types implement `From<FlowError>` so a
/// flow run can surface either kind through one `Result`.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No flow registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("Context type mismatch at dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Step handler failed. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal flow error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    FlowError::Handler { source: err }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
