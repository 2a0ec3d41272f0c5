// craftflow/src/registry.rs

//! `FlowRegistry<E>`: flows keyed by the `TypeId` of their context data.
//!
//! Callers never name a flow; they build a `FlowContext<T>` and the registry
//! dispatches to the one flow registered for `T`.

use crate::core::context_data::FlowContext;
use crate::core::control::FlowOutcome;
use crate::error::FlowError;
use crate::flow::definition::Flow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedFlow<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx` must hold a `FlowContext<T>` for the wrapped flow's `T`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr>;
}

struct FlowRunner<T, FlowErr>
where
  T: 'static + Send + Sync,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: Flow<T, FlowErr>,
}

#[async_trait]
impl<T, FlowErr, AppErr> ErasedFlow<AppErr> for FlowRunner<T, FlowErr>
where
  T: 'static + Send + Sync,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<FlowErr> + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr> {
    let typed = match ctx.downcast::<FlowContext<T>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<FlowContext<T>>().to_string();
        event!(Level::ERROR, %expected_type, "Context type mismatch at dispatch.");
        return Err(AppErr::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.flow.run(typed).await.map_err(AppErr::from)
  }
}

/// Holds one flow per context data type.
///
/// `AppErr` is what `run` returns; it absorbs both the flows' handler errors
/// and the registry's own `FlowError`s.
pub struct FlowRegistry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: RwLock<HashMap<TypeId, Arc<dyn ErasedFlow<AppErr>>>>,
  _app_err: PhantomData<AppErr>,
}

impl<AppErr> Default for FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
      _app_err: PhantomData,
    }
  }

  /// Registers `flow` for context type `T`, replacing any earlier one.
  pub fn register<T, FlowErr>(&self, flow: Flow<T, FlowErr>)
  where
    T: 'static + Send + Sync,
    FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<FlowErr>,
  {
    event!(
      Level::DEBUG,
      context_type = %std::any::type_name::<T>(),
      steps = ?flow.step_names(),
      "Registering flow."
    );
    let runner: Arc<dyn ErasedFlow<AppErr>> = Arc::new(FlowRunner { flow });
    self.flows.write().insert(TypeId::of::<T>(), runner);
  }

  pub fn is_registered<T: 'static + Send + Sync>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<T>())
  }

  /// Runs the flow registered for `T`. The caller keeps its own clone of
  /// `ctx` to read results afterwards.
  pub async fn run<T>(&self, ctx: FlowContext<T>) -> Result<FlowOutcome, AppErr>
  where
    T: 'static + Send + Sync,
  {
    let runner = self.flows.read().get(&TypeId::of::<T>()).cloned();
    let runner = runner.ok_or_else(|| {
      let context_type = std::any::type_name::<T>().to_string();
      event!(Level::ERROR, %context_type, "No flow registered.");
      AppErr::from(FlowError::NotRegistered { context_type })
    })?;
    runner.run_erased(Box::new(ctx)).await
  }
}
