// artisan_market/src/pipelines/contexts.rs

//! Context data for every application flow. Handlers receive these wrapped
//! in `craftflow::FlowContext`; the `Option` fields are filled in by steps.

use crate::models::{Cart, NewOrder, Order, Product, Review, Role, User};
use crate::state::AppState;
use uuid::Uuid;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub name: String,
  pub email: String,
  pub password: String,
  pub role: Role,
  pub created_user: Option<User>,
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub session_token: Option<String>,
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub authenticated_user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub product: Option<Product>,
  /// Loaded cart, or the empty one created for a first add.
  pub cart: Option<Cart>,
  pub cart_created: bool,
  pub saved_cart: Option<Cart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
  /// Zero or less removes the line.
  SetQuantity { product_id: Uuid, quantity: i32 },
  Remove { product_id: Uuid },
}

#[derive(Clone)]
pub struct CartMutationCtxData {
  pub app_state: AppState,
  pub authenticated_user_id: Uuid,
  pub mutation: CartMutation,
  pub cart: Option<Cart>,
  pub saved_cart: Option<Cart>,
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub authenticated_user_id: Uuid,
  /// Taken by the step that persists the order.
  pub payload: Option<NewOrder>,
  pub order: Option<Order>,
  pub cart_cleared: bool,
}

#[derive(Clone)]
pub struct AddReviewCtxData {
  pub app_state: AppState,
  pub reviewer: User,
  pub product_id: Uuid,
  pub rating: i32,
  pub comment: String,
  pub product: Option<Product>,
  pub review: Option<Review>,
  pub updated_product: Option<Product>,
}
