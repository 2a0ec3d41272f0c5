// craftflow/src/lib.rs

//! craftflow: async, type-safe step workflows.
//!
//! A `Flow<T, Err>` is an ordered list of named steps over shared context
//! data `T`. Each step carries `before`, `on` and `after` handlers; handlers
//! may stop the flow early or fail it with an application error. Steps can
//! be optional or skipped by a condition evaluated on the context.
//! `FlowRegistry<E>` keeps one flow per context type and dispatches runs.
//!
//! Typical use:
//! 1. Define a context struct holding inputs and slots for results.
//! 2. Build a `Flow` from step names and attach handlers with `.on()`.
//! 3. Register it once at startup.
//! 4. Per request, wrap a fresh context in `FlowContext::new`, run it through
//!    the registry, then read the results from your clone of the context.

pub mod core;
pub mod error;
pub mod flow;
pub mod registry;

pub use crate::core::context_data::FlowContext;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::flow::definition::Flow;
pub use crate::registry::FlowRegistry;
