pub mod context_data;
pub mod control;
pub mod handler;
pub mod step;

pub use context_data::FlowContext;
pub use control::{FlowOutcome, StepControl};
pub use handler::Handler;
pub use step::{SkipCondition, StepDef};
