// artisan_market/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{
  auth_handlers, cart_handlers, feedback_handlers, order_handlers, product_handlers, review_handlers, user_handlers,
  wishlist_handlers,
};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies, ids and query strings become validation errors with the
/// usual JSON error body instead of actix's plain-text defaults.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()));
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);

  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::signup_handler))
          .route("/login", web::post().to(auth_handlers::signin_handler))
          .route("/me", web::get().to(auth_handlers::me_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route(
            "/seller/{seller_id}",
            web::get().to(product_handlers::list_seller_products_handler),
          )
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/update", web::put().to(cart_handlers::update_cart_item_handler))
          .route(
            "/remove/{product_id}",
            web::delete().to(cart_handlers::remove_cart_item_handler),
          ),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          // Before "/{order_id}" so "myorders" is never parsed as an id.
          .route("/myorders", web::get().to(order_handlers::my_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/status",
            web::put().to(order_handlers::update_order_status_handler),
          ),
      )
      .service(
        web::scope("/reviews")
          .route("/{product_id}", web::post().to(review_handlers::add_review_handler))
          .route("/{product_id}", web::get().to(review_handlers::list_reviews_handler)),
      )
      .service(
        web::scope("/wishlist")
          .route("/add", web::post().to(wishlist_handlers::add_wishlist_handler))
          .route("/all", web::get().to(wishlist_handlers::all_wishlist_handler))
          .route("/my", web::get().to(wishlist_handlers::my_wishlist_handler))
          .route(
            "/remove/{entry_id}",
            web::delete().to(wishlist_handlers::remove_wishlist_handler),
          ),
      )
      .service(
        web::scope("/users")
          .route("", web::get().to(user_handlers::list_users_handler))
          .route("/{user_id}", web::delete().to(user_handlers::delete_user_handler)),
      )
      .service(
        web::scope("/feedback")
          .route("", web::post().to(feedback_handlers::submit_feedback_handler))
          .route("", web::get().to(feedback_handlers::list_feedback_handler)),
      ),
  );
}
