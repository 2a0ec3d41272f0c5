// artisan_market/src/lib.rs

//! Artisan Market: REST backend for a handmade-goods marketplace.
//!
//! Catalog, carts, orders, reviews, wishlists and feedback are served as JSON
//! under `/api`. Multi-step mutations (signup, signin, cart changes,
//! checkout, reviews) run as craftflow flows registered once at startup.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
