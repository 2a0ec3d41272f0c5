// craftflow/src/core/step.rs
use super::FlowContext;
use std::sync::Arc;

/// Evaluated right before a step runs; `true` skips the step.
pub type SkipCondition<T> = Arc<dyn Fn(FlowContext<T>) -> bool + Send + Sync + 'static>;

/// A named step of a flow.
#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  /// Optional steps without handlers are skipped instead of failing the run.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
