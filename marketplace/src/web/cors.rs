// artisan_market/src/web/cors.rs

use crate::config::AppConfig;
use crate::services::access_guard::LEGACY_TOKEN_HEADER;
use actix_cors::Cors;
use actix_web::http::header;

/// Browser clients are served from another origin. With no configured
/// origins every origin is allowed.
pub fn cors_middleware(config: &AppConfig) -> Cors {
  let cors = Cors::default()
    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
    .allowed_headers(vec![
      header::AUTHORIZATION,
      header::CONTENT_TYPE,
      header::ACCEPT,
      header::HeaderName::from_static(LEGACY_TOKEN_HEADER),
    ])
    .max_age(3600);

  if config.cors_allowed_origins.is_empty() {
    return cors.allow_any_origin();
  }
  config
    .cors_allowed_origins
    .iter()
    .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
