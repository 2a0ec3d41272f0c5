// artisan_market/src/main.rs

use artisan_market::config::AppConfig;
use artisan_market::services::seed;
use artisan_market::state::AppState;
use artisan_market::store;
use artisan_market::web::{configure_app_routes, cors_middleware};

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration

  // LOG_FORMAT=json for log shippers; human-readable otherwise.
  if std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false) {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  init_tracing();
  tracing::info!("Starting artisan market server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let store = match store::connect(&app_config).await {
    Ok(store) => store,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialize the store.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  if app_config.seed_db {
    match seed::run(store.as_ref(), &app_config).await {
      Ok(report) => tracing::info!(?report, "Database seeding finished."),
      Err(e) => tracing::error!(error = %e, "Failed to seed database."),
    }
  }

  let app_state = AppState::build(store, app_config.clone());
  tracing::info!("Application flows registered.");

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(cors_middleware(&app_config))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
