// tests/common/mod.rs
#![allow(dead_code)]

use craftflow::{FlowContext, FlowError, StepControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// A small basket-tallying context: steps push line totals and leave a
/// trail of which step ran.
#[derive(Clone, Debug, Default)]
pub struct TallyContext {
  pub total_cents: i64,
  pub trail: Vec<String>,
  pub halt_at: Option<String>,
  pub note: String,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // FlowError is not PartialEq, so keep its Debug rendering.
  #[error("flow error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Flow(format!("{:?}", err))
  }
}

/// Adds `cents` to the running total and records `step_name`; stops if the
/// context asks to halt at this step.
pub fn add_line_handler(step_name: &'static str, cents: i64) -> craftflow::Handler<TallyContext, TestError> {
  Box::new(move |ctx: FlowContext<TallyContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_cents += cents;
      guard.trail.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, total = guard.total_cents, "line added");
      if guard.halt_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> craftflow::Handler<TallyContext, TestError> {
  Box::new(move |ctx: FlowContext<TallyContext>| {
    Box::pin(async move {
      ctx.write().trail.push(step_name.to_string());
      Err(TestError::Step(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
