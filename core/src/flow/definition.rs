// craftflow/src/flow/definition.rs
use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered list of named steps over context data `T`, whose handlers fail
/// with `Err`.
///
/// `Err: From<FlowError>` lets the runner report engine failures (such as a
/// required step with no handlers) through the same error type the handlers
/// use.
pub struct Flow<T, Err>
where
  T: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<T>>,
  pub(crate) before: HashMap<String, Vec<Handler<T, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<T, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<T, Err>>>,
}

impl<T, Err> Flow<T, Err>
where
  T: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a flow from `(name, optional, skip_if)` tuples, in run order.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<T>>)]) -> Self {
    let mut seen = std::collections::HashSet::new();
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| {
        if !seen.insert(*name) {
          panic!("craftflow setup error: step '{}' declared twice.", name);
        }
        StepDef {
          name: (*name).to_string(),
          optional: *optional,
          skip_if: skip_if.clone(),
        }
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Step names in run order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Registering a handler for an undeclared step is a typo in setup code,
  /// so it panics at startup rather than failing a request later.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("craftflow setup error: step '{}' not found in flow definition.", step_name);
    }
  }
}
