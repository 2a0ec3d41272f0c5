// artisan_market/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod cart_handlers;
pub mod feedback_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod review_handlers;
pub mod user_handlers;
pub mod wishlist_handlers;
