// artisan_market/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::token_service::TokenService;
use crate::store::Store;
use craftflow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>, // Share loaded config
  pub tokens: TokenService,
}

impl AppState {
  /// Wires a state around `store` and registers every application flow.
  pub fn build(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    crate::pipelines::register_all_pipelines(&flows);
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_secs);
    Self {
      store,
      flows,
      config,
      tokens,
    }
  }
}
