// artisan_market/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

/// Prefix of `DATABASE_URL` that selects the in-process store instead of Postgres.
pub const MEMORY_STORE_URL: &str = "memory://";

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub jwt_secret: String,
  pub token_ttl_secs: i64,
  /// Browser origins allowed by CORS. Empty means any origin.
  pub cors_allowed_origins: Vec<String>,

  // Optional: for seeding DB on startup
  pub seed_db: bool,
  pub seed_admin_email: Option<String>,
  pub seed_admin_password: Option<String>,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("jwt_secret", &"[REDACTED]")
      .field("token_ttl_secs", &self.token_ttl_secs)
      .field("cors_allowed_origins", &self.cors_allowed_origins)
      .field("seed_db", &self.seed_db)
      .field("seed_admin_email", &self.seed_admin_email)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let get_optional = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.trim().is_empty() {
      return Err(AppError::Config("JWT_SECRET must not be empty".to_string()));
    }

    let token_ttl_secs = get_env("TOKEN_TTL_SECS")
      .unwrap_or_else(|_| "86400".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid TOKEN_TTL_SECS: {}", e)))?;
    if token_ttl_secs <= 0 {
      return Err(AppError::Config("TOKEN_TTL_SECS must be positive".to_string()));
    }

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    let cors_allowed_origins = get_optional("CORS_ALLOWED_ORIGIN")
      .map(|raw| parse_origins(&raw))
      .unwrap_or_default();

    let config = Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      token_ttl_secs,
      cors_allowed_origins,
      seed_db,
      seed_admin_email: get_optional("SEED_ADMIN_EMAIL"),
      seed_admin_password: get_optional("SEED_ADMIN_PASSWORD"),
    };

    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(config = ?config, "Loaded config details");
    Ok(config)
  }

  /// Builds a config around the in-memory store, for tests and local experiments.
  pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: MEMORY_STORE_URL.to_string(),
      jwt_secret: jwt_secret.into(),
      token_ttl_secs: 3600,
      cors_allowed_origins: Vec::new(),
      seed_db: false,
      seed_admin_email: None,
      seed_admin_password: None,
    }
  }

  pub fn uses_memory_store(&self) -> bool {
    self.database_url.starts_with(MEMORY_STORE_URL)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

/// Comma-separated origins, trimmed, without trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(|o| o.trim().trim_end_matches('/'))
    .filter(|o| !o.is_empty())
    .map(str::to_string)
    .collect()
}
