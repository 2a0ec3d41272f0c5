// craftflow/src/core/handler.rs

//! The boxed handler type stored by a `Flow`.

use crate::core::context_data::FlowContext;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// An async step handler.
///
/// Each invocation receives its own clone of the run's `FlowContext<T>`.
/// Handlers lock the context to read inputs, drop the guard, await their
/// I/O, then lock again to write results back.
pub type Handler<T, Err> = Box<
  dyn Fn(FlowContext<T>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;
