// craftflow/src/core/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable state threaded through every step of a flow run.
///
/// Cloning is cheap (an `Arc` bump) and every clone observes the same data,
/// which is how callers read results back after `Flow::run` returns.
///
/// IMPORTANT: guards are blocking `parking_lot` guards and MUST be dropped
/// before any `.await` in a handler.
#[derive(Debug)]
pub struct FlowContext<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowContext<T> {
  pub fn new(data: T) -> Self {
    FlowContext(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Attempts to acquire a read lock without blocking.
  pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
    self.0.try_read()
  }

  /// Attempts to acquire a write lock without blocking.
  pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
    self.0.try_write()
  }
}

impl<T: Send + Sync + 'static> Clone for FlowContext<T> {
  fn clone(&self) -> Self {
    FlowContext(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for FlowContext<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
