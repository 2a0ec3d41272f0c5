// artisan_market/src/pipelines/checkout_pipeline.rs

use crate::errors::{AppError, Result};
use crate::pipelines::contexts::CheckoutCtxData;
use craftflow::{Flow, FlowContext, FlowRegistry, StepControl};
use tracing::{error, info, warn};

/// Checkout turns a client-supplied cart snapshot into an order and then
/// drops the cart. The two writes are independent: if clearing the cart
/// fails the order stays and the caller sees a server error.
pub fn register_checkout_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Flow::<CheckoutCtxData, AppError>::new(&[
    ("validate_order_items", false, None),
    ("persist_order", false, None),
    ("clear_cart_after_order", false, None),
  ]);

  p.on("validate_order_items", |ctx: FlowContext<CheckoutCtxData>| async move {
    let guard = ctx.read();
    let payload = guard
      .payload
      .as_ref()
      .ok_or_else(|| AppError::Validation("No order items.".to_string()))?;
    if let Err(e) = payload.validate() {
      warn!(user_id = %guard.authenticated_user_id, "Checkout rejected: {}", e);
      return Err(e);
    }
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("persist_order", persist_order);
  p.on("clear_cart_after_order", clear_cart_after_order);

  flows.register(p);
  info!("Checkout flow registered.");
}

async fn persist_order(ctx: FlowContext<CheckoutCtxData>) -> Result<StepControl> {
  let (user_id, payload, store) = {
    let mut guard = ctx.write();
    (
      guard.authenticated_user_id,
      guard.payload.take(),
      guard.app_state.store.clone(),
    )
  };
  let payload = payload.ok_or_else(|| AppError::Internal("Order payload already consumed.".to_string()))?;

  let order = store.insert_order(payload.into_order(user_id)).await?;
  info!(
    "Checkout (Order {}): Order recorded for user {} with {} lines, total {}.",
    order.id,
    user_id,
    order.order_items.len(),
    order.total_price_cents
  );
  ctx.write().order = Some(order);
  Ok(StepControl::Continue)
}

async fn clear_cart_after_order(ctx: FlowContext<CheckoutCtxData>) -> Result<StepControl> {
  let (user_id, order_id, store) = {
    let guard = ctx.read();
    (
      guard.authenticated_user_id,
      guard.order.as_ref().map(|o| o.id),
      guard.app_state.store.clone(),
    )
  };

  match store.delete_cart(user_id).await {
    Ok(deleted) => {
      info!(?order_id, deleted, "Cart for user {} cleared after order.", user_id);
      ctx.write().cart_cleared = true;
      Ok(StepControl::Continue)
    }
    Err(e) => {
      error!(?order_id, error = %e, "Order was saved but the cart could not be cleared.");
      Err(e)
    }
  }
}
