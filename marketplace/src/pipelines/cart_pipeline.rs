// artisan_market/src/pipelines/cart_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::Cart;
use crate::pipelines::contexts::{AddToCartCtxData, CartMutation, CartMutationCtxData};
use craftflow::{Flow, FlowContext, FlowRegistry, SkipCondition, StepControl};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub fn register_add_to_cart_pipeline(flows: &FlowRegistry<AppError>) {
  let cart_already_loaded: SkipCondition<AddToCartCtxData> = Arc::new(|ctx: FlowContext<AddToCartCtxData>| {
    let loaded = ctx.read().cart.is_some();
    loaded
  });

  let mut p = Flow::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("fetch_product_for_cart", false, None),
    ("load_cart", false, None),
    ("create_empty_cart", false, Some(cart_already_loaded)),
    ("merge_cart_line", false, None),
    ("persist_cart", false, None),
  ]);

  p.on("validate_cart_input", |ctx: FlowContext<AddToCartCtxData>| async move {
    let quantity = ctx.read().quantity;
    if quantity < 1 {
      warn!("Add to Cart: Invalid quantity ({}) provided. Must be at least 1.", quantity);
      return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("fetch_product_for_cart", fetch_product_for_cart);

  p.on("load_cart", |ctx: FlowContext<AddToCartCtxData>| async move {
    let (user_id, store) = {
      let guard = ctx.read();
      (guard.authenticated_user_id, guard.app_state.store.clone())
    };
    let cart = store.find_cart(user_id).await?;
    debug!(found = cart.is_some(), "Add to Cart: Cart lookup finished.");
    ctx.write().cart = cart;
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("create_empty_cart", |ctx: FlowContext<AddToCartCtxData>| async move {
    let mut guard = ctx.write();
    info!("Add to Cart: No cart for user {}, starting an empty one.", guard.authenticated_user_id);
    guard.cart = Some(Cart::empty(guard.authenticated_user_id));
    guard.cart_created = true;
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("merge_cart_line", |ctx: FlowContext<AddToCartCtxData>| async move {
    let mut guard = ctx.write();
    let quantity = guard.quantity;
    let product = guard
      .product
      .clone()
      .ok_or_else(|| AppError::Internal("Cart merge reached without a product.".to_string()))?;
    let cart = guard
      .cart
      .as_mut()
      .ok_or_else(|| AppError::Internal("Cart merge reached without a cart.".to_string()))?;
    let line = cart.add_line(&product, quantity)?;
    info!(
      "Add to Cart: Product {} now has quantity {} in the cart.",
      line.product_id, line.quantity
    );
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("persist_cart", |ctx: FlowContext<AddToCartCtxData>| async move {
    let (cart, store) = {
      let guard = ctx.read();
      (guard.cart.clone(), guard.app_state.store.clone())
    };
    let cart = cart.ok_or_else(|| AppError::Internal("No cart to persist.".to_string()))?;
    let saved = store.save_cart(&cart).await?;
    ctx.write().saved_cart = Some(saved);
    Ok::<_, AppError>(StepControl::Continue)
  });

  flows.register(p);
  info!("Add to Cart flow registered.");
}

async fn fetch_product_for_cart(ctx: FlowContext<AddToCartCtxData>) -> Result<StepControl> {
  let (product_id, store) = {
    let guard = ctx.read();
    (guard.product_id, guard.app_state.store.clone())
  };

  match store.find_product(product_id).await? {
    Some(product) => {
      debug!("Add to Cart: Product {} found. Price: {}", product.id, product.price_cents);
      ctx.write().product = Some(product);
      Ok(StepControl::Continue)
    }
    None => {
      warn!("Add to Cart: Product {} not found.", product_id);
      Err(AppError::NotFound("Product not found.".to_string()))
    }
  }
}

/// Set-quantity and remove share one flow: both need an existing cart.
pub fn register_cart_mutation_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Flow::<CartMutationCtxData, AppError>::new(&[
    ("load_existing_cart", false, None),
    ("apply_cart_mutation", false, None),
    ("persist_cart", false, None),
  ]);

  p.on("load_existing_cart", |ctx: FlowContext<CartMutationCtxData>| async move {
    let (user_id, store) = {
      let guard = ctx.read();
      (guard.authenticated_user_id, guard.app_state.store.clone())
    };
    let cart = store.find_cart(user_id).await?.ok_or_else(|| {
      warn!("Cart mutation for user {} without a cart.", user_id);
      AppError::NotFound("Cart not found.".to_string())
    })?;
    ctx.write().cart = Some(cart);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("apply_cart_mutation", |ctx: FlowContext<CartMutationCtxData>| async move {
    let mut guard = ctx.write();
    let mutation = guard.mutation;
    let cart = guard
      .cart
      .as_mut()
      .ok_or_else(|| AppError::Internal("Cart mutation reached without a cart.".to_string()))?;
    match mutation {
      CartMutation::SetQuantity { product_id, quantity } => cart.set_quantity(product_id, quantity)?,
      CartMutation::Remove { product_id } => cart.remove_line(product_id)?,
    }
    debug!(?mutation, remaining_lines = cart.items.len(), "Cart mutation applied.");
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("persist_cart", |ctx: FlowContext<CartMutationCtxData>| async move {
    let (cart, store) = {
      let guard = ctx.read();
      (guard.cart.clone(), guard.app_state.store.clone())
    };
    let cart = cart.ok_or_else(|| AppError::Internal("No cart to persist.".to_string()))?;
    let saved = store.save_cart(&cart).await?;
    ctx.write().saved_cart = Some(saved);
    Ok::<_, AppError>(StepControl::Continue)
  });

  flows.register(p);
  info!("Cart mutation flow registered.");
}
