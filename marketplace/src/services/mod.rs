// artisan_market/src/services/mod.rs

pub mod access_guard;
pub mod auth_service;
pub mod seed;
pub mod token_service;
