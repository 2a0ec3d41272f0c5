// artisan_market/src/web/extractors.rs

//! Identity extractors. Declaring one as a handler argument is what makes a
//! route require a token (and, for the role wrappers, a role).

use crate::errors::AppError;
use crate::models::user::User;
use crate::services::access_guard;
use crate::state::AppState;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

/// Any signed-in user, loaded fresh from the store.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let app_state = req.app_data::<web::Data<AppState>>().cloned();
    let token = access_guard::extract_token(req.headers()).map(str::to_owned);

    Box::pin(async move {
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let user = access_guard::resolve_identity(app_state.store.as_ref(), &app_state.tokens, token.as_deref()).await?;
      Ok(AuthenticatedUser { user })
    })
  }
}

/// A seller or an admin.
#[derive(Debug, Clone)]
pub struct SellerUser {
  pub user: User,
}

impl FromRequest for SellerUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let identity = AuthenticatedUser::from_request(req, payload);
    Box::pin(async move {
      let AuthenticatedUser { user } = identity.await?;
      access_guard::require_seller_or_admin(&user)?;
      Ok(SellerUser { user })
    })
  }
}

#[derive(Debug, Clone)]
pub struct AdminUser {
  pub user: User,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let identity = AuthenticatedUser::from_request(req, payload);
    Box::pin(async move {
      let AuthenticatedUser { user } = identity.await?;
      access_guard::require_admin(&user)?;
      Ok(AdminUser { user })
    })
  }
}
