// craftflow/src/flow/hooks.rs

//! Registration of `before`, `on` and `after` handlers.
//!
//! A handler may fail with any error convertible into the flow's `Err`, so
//! application steps can return their own error type directly.

use crate::core::context_data::FlowContext;
use crate::core::control::StepControl;
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::flow::definition::Flow;
use std::collections::HashMap;
use std::future::Future;

#[derive(Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl<T, Err> Flow<T, Err>
where
  T: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs ahead of the step's `on` handlers.
  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::Before, step_name, handler_fn);
  }

  /// The step's main work.
  pub fn on<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::On, step_name, handler_fn);
  }

  /// Runs once the step's `on` handlers all continued.
  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(Phase::After, step_name, handler_fn);
  }

  fn push_handler<F, HandlerErr>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let boxed: Handler<T, Err> = Box::new(move |ctx| {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    let table: &mut HashMap<String, Vec<Handler<T, Err>>> = match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    };
    table.entry(step_name.to_string()).or_default().push(boxed);
  }
}
