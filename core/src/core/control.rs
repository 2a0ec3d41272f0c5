// craftflow/src/core/control.rs

//! Signals exchanged between step handlers and the flow runner.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Keep going with the remaining handlers and steps.
  Continue,
  /// Halt the whole flow right after this handler. Not an error.
  Stop,
}

/// Outcome of a flow run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}
