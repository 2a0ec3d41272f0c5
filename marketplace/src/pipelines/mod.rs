// artisan_market/src/pipelines/mod.rs

//! Defines and registers the craftflow flows behind every multi-step mutation.

use crate::errors::{AppError, Result};
use craftflow::{FlowContext, FlowOutcome, FlowRegistry};
use tracing::warn;

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod review_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every flow. Called once while building `AppState`.
pub fn register_all_pipelines(flows: &FlowRegistry<AppError>) {
  tracing::info!("Registering application flows...");

  signup_pipeline::register_signup_pipeline(flows);
  signin_pipeline::register_signin_pipeline(flows);
  cart_pipeline::register_add_to_cart_pipeline(flows);
  cart_pipeline::register_cart_mutation_pipeline(flows);
  checkout_pipeline::register_checkout_pipeline(flows);
  review_pipeline::register_add_review_pipeline(flows);

  tracing::info!("All application flows registered.");
}

/// Runs the flow for `T` and treats an early stop as an internal failure;
/// none of the application flows stop on purpose.
pub async fn run_to_completion<T>(flows: &FlowRegistry<AppError>, ctx: FlowContext<T>, process: &str) -> Result<()>
where
  T: 'static + Send + Sync,
{
  match flows.run(ctx).await? {
    FlowOutcome::Completed => Ok(()),
    FlowOutcome::Stopped => {
      warn!(process, "Flow was stopped by a handler.");
      Err(AppError::Internal(format!("{} was halted by an internal step.", process)))
    }
  }
}
