// craftflow/src/flow/execution.rs
use crate::core::context_data::FlowContext;
use crate::core::control::{FlowOutcome, StepControl};
use crate::core::handler::Handler;
use crate::core::step::StepDef;
use crate::error::FlowError;
use crate::flow::definition::Flow;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<T, Err> Flow<T, Err>
where
  T: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in declaration order against `ctx`.
  ///
  /// Per step: the skip condition is checked first, then `before`, `on` and
  /// `after` handlers run in registration order. The first `Stop` ends the
  /// run with `FlowOutcome::Stopped`; the first error ends it with that error.
  /// A non-optional step with no handlers at all fails with
  /// `FlowError::HandlerMissing`.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(context_type = %std::any::type_name::<T>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowContext<T>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Flow run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = info_span!(
        "flow_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );
      if self.run_step(step_def, &ctx).instrument(step_span).await? == StepControl::Stop {
        return Ok(FlowOutcome::Stopped);
      }
    }

    event!(Level::DEBUG, "Flow run completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<T>, ctx: &FlowContext<T>) -> Result<StepControl, Err> {
    let step_name = step_def.name.as_str();

    if let Some(skip_if) = &step_def.skip_if {
      if skip_if(ctx.clone()) {
        event!(Level::DEBUG, "Step skipped by its skip condition.");
        return Ok(StepControl::Continue);
      }
    }

    let phases = [
      ("before", self.before.get(step_name)),
      ("on", self.on.get(step_name)),
      ("after", self.after.get(step_name)),
    ];

    if phases.iter().all(|(_, handlers)| handlers.map_or(true, |v| v.is_empty())) {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepControl::Continue);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in phases {
      if let Some(handlers) = handlers {
        if run_phase(phase, handlers, ctx).await? == StepControl::Stop {
          event!(Level::INFO, phase, "Flow stopped by a handler.");
          return Ok(StepControl::Stop);
        }
      }
    }
    Ok(StepControl::Continue)
  }
}

async fn run_phase<T, Err>(
  phase: &'static str,
  handlers: &[Handler<T, Err>],
  ctx: &FlowContext<T>,
) -> Result<StepControl, Err>
where
  T: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    event!(Level::TRACE, phase, handler_index = handler_idx, "Running handler.");
    match handler_fn(ctx.clone()).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Stop) => return Ok(StepControl::Stop),
      Err(e) => {
        event!(Level::ERROR, phase, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Continue)
}
