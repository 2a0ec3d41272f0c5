// End-to-end tests driving the HTTP surface over the in-memory store.

use actix_web::http::{header, Method, StatusCode};
use actix_web::{test, web, App};
use artisan_market::config::AppConfig;
use artisan_market::errors::{AppError, Result};
use artisan_market::models::product::MAX_PRICE_CENTS;
use artisan_market::models::{
  Cart, Feedback, NewUser, Order, OrderStatus, Product, ProductFilter, RatingSummary, Review, Role, User,
  WishlistEntry,
};
use artisan_market::services::auth_service;
use artisan_market::state::AppState;
use artisan_market::store::memory::MemoryStore;
use artisan_market::store::Store;
use artisan_market::web::{configure_app_routes, cors_middleware};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_env_filter("warn")
    .with_test_writer()
    .try_init();
});

fn test_state(store: Arc<dyn Store>) -> AppState {
  Lazy::force(&TRACING);
  AppState::build(store, Arc::new(AppConfig::in_memory("integration-test-secret")))
}

/// Sends `$req` and returns the status plus the JSON body (or `Null`).
macro_rules! send {
  ($app:expr, $req:expr) => {{
    let resp = test::call_service(&$app, $req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
  }};
}

macro_rules! init_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}

fn signup_body(name: &str, email: &str, role: &str) -> Value {
  json!({ "name": name, "email": email, "password": "correct horse", "role": role })
}

fn product_body(name: &str, price_cents: i64) -> Value {
  json!({
      "name": name,
      "description": "Made by hand.",
      "priceCents": price_cents,
      "imageUrl": "/images/item.jpg",
      "category": "Pottery",
      "countInStock": 5,
  })
}

fn order_body(items: Value) -> Value {
  json!({
      "orderItems": items,
      "shippingAddress": { "address": "1 Kiln Lane", "phoneNumber": "555-0100" },
      "paymentMethod": "card",
      "taxPriceCents": 100,
      "shippingPriceCents": 500,
      "totalPriceCents": 8600,
  })
}

/// Admins only come from seeding, so tests insert one straight into the store.
async fn insert_admin(state: &AppState) -> (User, String) {
  let admin = state
    .store
    .insert_user(NewUser {
      name: "Root".into(),
      email: "root@example.com".into(),
      password_hash: auth_service::hash_password("admin-password").unwrap(),
      role: Role::Admin,
    })
    .await
    .unwrap();
  let token = state.tokens.issue(&admin).unwrap();
  (admin, token)
}

#[actix_rt::test]
async fn register_login_and_me() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/register")
      .set_json(signup_body("Ada", " Ada@Example.com ", "seller"))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["user"]["email"], "ada@example.com");
  assert_eq!(body["user"]["role"], "seller");
  assert!(body["user"].get("passwordHash").is_none());
  assert!(body["token"].as_str().is_some());

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/register")
      .set_json(signup_body("Ada again", "ada@example.com", "buyer"))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/login")
      .set_json(json!({ "email": "ADA@example.com", "password": "correct horse" }))
  );
  assert_eq!(status, StatusCode::OK);
  let token = body["token"].as_str().unwrap().to_string();

  let (status, body) = send!(app, test::TestRequest::get().uri("/api/auth/me").insert_header(bearer(&token)));
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user"]["name"], "Ada");

  // The legacy header is still honored.
  let (status, _) = send!(
    app,
    test::TestRequest::get().uri("/api/auth/me").insert_header(("x-auth-token", token.clone()))
  );
  assert_eq!(status, StatusCode::OK);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/login")
      .set_json(json!({ "email": "ada@example.com", "password": "wrong password" }))
  );
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Invalid email or password.");
}

#[actix_rt::test]
async fn signup_rejects_reserved_role_and_short_password() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/register")
      .set_json(signup_body("Mallory", "mallory@example.com", "admin"))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send!(
    app,
    test::TestRequest::post().uri("/api/auth/register").set_json(json!({
        "name": "Short",
        "email": "short@example.com",
        "password": "abc",
    }))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn protected_routes_require_a_valid_token() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);

  let (status, body) = send!(app, test::TestRequest::get().uri("/api/cart"));
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());

  let (status, _) = send!(
    app,
    test::TestRequest::get().uri("/api/cart").insert_header(bearer("not-a-jwt"))
  );
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  // A valid token for a deleted account is rejected too.
  let ghost = NewUser {
    name: "Ghost".into(),
    email: "ghost@example.com".into(),
    password_hash: "h".into(),
    role: Role::Buyer,
  }
  .into_user();
  let token = state.tokens.issue(&ghost).unwrap();
  let (status, _) = send!(app, test::TestRequest::get().uri("/api/cart").insert_header(bearer(&token)));
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn catalog_ownership_rules() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let (_, admin_token) = insert_admin(&state).await;

  let (_, seller) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/register")
      .set_json(signup_body("Sel", "sel@example.com", "seller"))
  );
  let seller_token = seller["token"].as_str().unwrap().to_string();
  let seller_id = seller["user"]["id"].as_str().unwrap().to_string();
  let (_, rival) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/register")
      .set_json(signup_body("Riv", "riv@example.com", "seller"))
  );
  let rival_token = rival["token"].as_str().unwrap().to_string();
  let (_, buyer) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/register")
      .set_json(signup_body("Bea", "bea@example.com", "buyer"))
  );
  let buyer_token = buyer["token"].as_str().unwrap().to_string();

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/products")
      .insert_header(bearer(&buyer_token))
      .set_json(product_body("Mug", 4000))
  );
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/products")
      .insert_header(bearer(&seller_token))
      .set_json(product_body("Glazed Mug", 4000))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["product"]["sellerId"], seller_id.as_str());
  let product_id = body["product"]["id"].as_str().unwrap().to_string();

  let (status, body) = send!(app, test::TestRequest::get().uri("/api/products?keyword=glazed"));
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["products"].as_array().unwrap().len(), 1);
  let (_, body) = send!(app, test::TestRequest::get().uri("/api/products?keyword=.*"));
  assert!(body["products"].as_array().unwrap().is_empty());

  let (status, _) = send!(
    app,
    test::TestRequest::put()
      .uri(&format!("/api/products/{}", product_id))
      .insert_header(bearer(&rival_token))
      .set_json(json!({ "priceCents": 1 }))
  );
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri(&format!("/api/products/{}", product_id))
      .insert_header(bearer(&seller_token))
      .set_json(json!({ "priceCents": 4500 }))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["product"]["priceCents"], 4500);
  assert_eq!(body["product"]["name"], "Glazed Mug");

  let (status, _) = send!(
    app,
    test::TestRequest::get()
      .uri(&format!("/api/products/seller/{}", seller_id))
      .insert_header(bearer(&rival_token))
  );
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, body) = send!(
    app,
    test::TestRequest::get()
      .uri(&format!("/api/products/seller/{}", seller_id))
      .insert_header(bearer(&seller_token))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["products"].as_array().unwrap().len(), 1);

  let (status, _) = send!(
    app,
    test::TestRequest::delete()
      .uri(&format!("/api/products/{}", product_id))
      .insert_header(bearer(&rival_token))
  );
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send!(
    app,
    test::TestRequest::delete()
      .uri(&format!("/api/products/{}", product_id))
      .insert_header(bearer(&admin_token))
  );
  assert_eq!(status, StatusCode::OK);
  let (status, _) = send!(app, test::TestRequest::get().uri(&format!("/api/products/{}", product_id)));
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send!(app, test::TestRequest::get().uri("/api/products/not-a-uuid"));
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn seller_with_product(state: &AppState, price_cents: i64) -> Product {
  let seller = state
    .store
    .insert_user(NewUser {
      name: "Potter".into(),
      email: format!("potter-{}@example.com", Uuid::new_v4()),
      password_hash: "h".into(),
      role: Role::Seller,
    })
    .await
    .unwrap();
  let product: artisan_market::models::NewProduct = serde_json::from_value(product_body("Bowl", price_cents)).unwrap();
  state.store.insert_product(product.into_product(seller.id)).await.unwrap()
}

async fn buyer_token(state: &AppState, email: &str) -> (User, String) {
  let buyer = state
    .store
    .insert_user(NewUser {
      name: "Buyer".into(),
      email: email.into(),
      password_hash: "h".into(),
      role: Role::Buyer,
    })
    .await
    .unwrap();
  let token = state.tokens.issue(&buyer).unwrap();
  (buyer, token)
}

#[actix_rt::test]
async fn cart_merges_lines_and_applies_mutations() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let product = seller_with_product(&state, 4000).await;
  let (_, token) = buyer_token(&state, "cart@example.com").await;

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri("/api/cart/update")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id, "quantity": 2 }))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Cart not found.");

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/cart/add")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id, "quantity": 2 }))
  );
  assert_eq!(status, StatusCode::OK);
  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/cart/add")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id }))
  );
  assert_eq!(status, StatusCode::OK);
  let items = body["cart"]["items"].as_array().unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["quantity"], 3);
  assert_eq!(body["subtotalCents"], 12000);
  assert_eq!(body["itemCount"], 3);

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/cart/add")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": Uuid::new_v4(), "quantity": 1 }))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/cart/add")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id, "quantity": 0 }))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri("/api/cart/update")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id, "quantity": 0 }))
  );
  assert_eq!(status, StatusCode::OK);
  assert!(body["cart"]["items"].as_array().unwrap().is_empty());
  assert_eq!(body["subtotalCents"], 0);

  let (status, _) = send!(
    app,
    test::TestRequest::delete()
      .uri(&format!("/api/cart/remove/{}", product.id))
      .insert_header(bearer(&token))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn checkout_creates_order_and_clears_cart() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let product = seller_with_product(&state, 4000).await;
  let (buyer, token) = buyer_token(&state, "checkout@example.com").await;
  let (_, other_token) = buyer_token(&state, "nosy@example.com").await;

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/orders")
      .insert_header(bearer(&token))
      .set_json(order_body(json!([])))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  send!(
    app,
    test::TestRequest::post()
      .uri("/api/cart/add")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id, "quantity": 2 }))
  );

  let line = json!([{ "productId": product.id, "name": "Bowl", "priceCents": 4000, "quantity": 2 }]);
  let (status, first) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/orders")
      .insert_header(bearer(&token))
      .set_json(order_body(line.clone()))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(first["status"], "Processing");
  assert_eq!(first["userId"], buyer.id.to_string());
  assert!(state.store.find_cart(buyer.id).await.unwrap().is_none());

  let (status, body) = send!(app, test::TestRequest::get().uri("/api/cart").insert_header(bearer(&token)));
  assert_eq!(status, StatusCode::OK);
  assert!(body["cart"]["items"].as_array().unwrap().is_empty());

  let (_, second) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/orders")
      .insert_header(bearer(&token))
      .set_json(order_body(line))
  );

  let (status, mine) = send!(
    app,
    test::TestRequest::get().uri("/api/orders/myorders").insert_header(bearer(&token))
  );
  assert_eq!(status, StatusCode::OK);
  let mine = mine.as_array().unwrap();
  assert_eq!(mine.len(), 2);
  assert_eq!(mine[0]["id"], second["id"]);
  assert_eq!(mine[1]["id"], first["id"]);

  let order_uri = format!("/api/orders/{}", first["id"].as_str().unwrap());
  let (status, _) = send!(app, test::TestRequest::get().uri(&order_uri).insert_header(bearer(&token)));
  assert_eq!(status, StatusCode::OK);
  let (status, _) = send!(
    app,
    test::TestRequest::get().uri(&order_uri).insert_header(bearer(&other_token))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn order_status_updates_are_admin_only() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let product = seller_with_product(&state, 2500).await;
  let (_, token) = buyer_token(&state, "status@example.com").await;
  let (_, admin_token) = insert_admin(&state).await;

  let line = json!([{ "productId": product.id, "name": "Bowl", "priceCents": 2500, "quantity": 1 }]);
  let (_, order) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/orders")
      .insert_header(bearer(&token))
      .set_json(order_body(line))
  );
  let status_uri = format!("/api/orders/{}/status", order["id"].as_str().unwrap());

  let (status, _) = send!(
    app,
    test::TestRequest::put()
      .uri(&status_uri)
      .insert_header(bearer(&token))
      .set_json(json!({ "status": "Shipped" }))
  );
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri(&status_uri)
      .insert_header(bearer(&admin_token))
      .set_json(json!({ "status": "Shipped" }))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "Shipped");
}

#[actix_rt::test]
async fn reviews_are_unique_and_update_rating() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let product = seller_with_product(&state, 4000).await;
  let (_, first_token) = buyer_token(&state, "r1@example.com").await;
  let (_, second_token) = buyer_token(&state, "r2@example.com").await;
  let review_uri = format!("/api/reviews/{}", product.id);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri(&review_uri)
      .insert_header(bearer(&first_token))
      .set_json(json!({ "rating": 5, "comment": "Lovely glaze." }))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["numReviews"], 1);

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri(&review_uri)
      .insert_header(bearer(&first_token))
      .set_json(json!({ "rating": 1 }))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri(&review_uri)
      .insert_header(bearer(&second_token))
      .set_json(json!({ "rating": 6 }))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri(&review_uri)
      .insert_header(bearer(&second_token))
      .set_json(json!({ "rating": 4 }))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["rating"], 4.5);
  assert_eq!(body["numReviews"], 2);

  let (status, body) = send!(app, test::TestRequest::get().uri(&review_uri));
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 2);

  let stored = state.store.find_product(product.id).await.unwrap().unwrap();
  assert_eq!(stored.num_reviews, 2);
  assert!((stored.rating - 4.5).abs() < f64::EPSILON);

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri(&format!("/api/reviews/{}", Uuid::new_v4()))
      .insert_header(bearer(&second_token))
      .set_json(json!({ "rating": 3 }))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn wishlist_entries_belong_to_their_creator() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let (_, owner_token) = buyer_token(&state, "wish@example.com").await;
  let (_, other_token) = buyer_token(&state, "other@example.com").await;

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/wishlist/add")
      .insert_header(bearer(&owner_token))
      .set_json(json!({ "productName": "  Walnut cutting board " }))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["item"]["productName"], "Walnut cutting board");
  assert_eq!(body["item"]["userEmail"], "wish@example.com");
  let remove_uri = format!("/api/wishlist/remove/{}", body["item"]["id"].as_str().unwrap());

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/wishlist/add")
      .insert_header(bearer(&owner_token))
      .set_json(json!({ "productName": "" }))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, all) = send!(app, test::TestRequest::get().uri("/api/wishlist/all"));
  assert_eq!(all.as_array().unwrap().len(), 1);
  let (_, mine) = send!(
    app,
    test::TestRequest::get().uri("/api/wishlist/my").insert_header(bearer(&other_token))
  );
  assert!(mine.as_array().unwrap().is_empty());

  let (status, _) = send!(
    app,
    test::TestRequest::delete().uri(&remove_uri).insert_header(bearer(&other_token))
  );
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send!(
    app,
    test::TestRequest::delete().uri(&remove_uri).insert_header(bearer(&owner_token))
  );
  assert_eq!(status, StatusCode::OK);
  let (status, _) = send!(
    app,
    test::TestRequest::delete().uri(&remove_uri).insert_header(bearer(&owner_token))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn admin_user_and_feedback_management() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let (admin, admin_token) = insert_admin(&state).await;
  let (buyer, token) = buyer_token(&state, "fb@example.com").await;

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/feedback")
      .insert_header(bearer(&token))
      .set_json(json!({ "message": "More mugs please." }))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["feedback"]["email"], "fb@example.com");

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/feedback")
      .insert_header(bearer(&token))
      .set_json(json!({ "message": "   " }))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send!(app, test::TestRequest::get().uri("/api/feedback").insert_header(bearer(&token)));
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "Not authorized as an admin.");
  let (status, body) = send!(
    app,
    test::TestRequest::get().uri("/api/feedback").insert_header(bearer(&admin_token))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);

  let (status, body) = send!(app, test::TestRequest::get().uri("/api/users").insert_header(bearer(&admin_token)));
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 2);

  let (status, _) = send!(
    app,
    test::TestRequest::delete()
      .uri(&format!("/api/users/{}", admin.id))
      .insert_header(bearer(&admin_token))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send!(
    app,
    test::TestRequest::delete()
      .uri(&format!("/api/users/{}", Uuid::new_v4()))
      .insert_header(bearer(&admin_token))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send!(
    app,
    test::TestRequest::delete()
      .uri(&format!("/api/users/{}", buyer.id))
      .insert_header(bearer(&admin_token))
  );
  assert_eq!(status, StatusCode::OK);

  // The deleted account's token no longer resolves.
  let (status, _) = send!(app, test::TestRequest::get().uri("/api/auth/me").insert_header(bearer(&token)));
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn malformed_json_is_a_validation_error() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/auth/login")
      .insert_header(("Content-Type", "application/json"))
      .set_payload("{ not json")
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) = send!(app, test::TestRequest::get().uri("/api/health"));
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn cart_quantity_overflow_is_rejected() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let product = seller_with_product(&state, 100).await;
  let (buyer, token) = buyer_token(&state, "bulk@example.com").await;

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/cart/add")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id, "quantity": i32::MAX }))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["subtotalCents"], 100 * i64::from(i32::MAX));

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/cart/add")
      .insert_header(bearer(&token))
      .set_json(json!({ "productId": product.id, "quantity": 1 }))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Cart quantity is too large.");

  let stored = state.store.find_cart(buyer.id).await.unwrap().unwrap();
  assert_eq!(stored.items[0].quantity, i32::MAX);
}

#[actix_rt::test]
async fn listing_price_is_capped() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = init_app!(state);
  let seller = state
    .store
    .insert_user(NewUser {
      name: "Big".into(),
      email: "big@example.com".into(),
      password_hash: "h".into(),
      role: Role::Seller,
    })
    .await
    .unwrap();
  let token = state.tokens.issue(&seller).unwrap();

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/products")
      .insert_header(bearer(&token))
      .set_json(product_body("Gilded throne", i64::MAX / 2))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/products")
      .insert_header(bearer(&token))
      .set_json(product_body("Gilded throne", MAX_PRICE_CENTS))
  );
  assert_eq!(status, StatusCode::CREATED);
}

#[actix_rt::test]
async fn cors_preflight_allows_configured_origin() {
  Lazy::force(&TRACING);
  let mut config = AppConfig::in_memory("integration-test-secret");
  config.cors_allowed_origins = vec!["http://localhost:3000".to_string()];
  let state = AppState::build(Arc::new(MemoryStore::new()), Arc::new(config.clone()));
  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(state))
      .wrap(cors_middleware(&config))
      .configure(configure_app_routes),
  )
  .await;

  let resp = test::call_service(
    &app,
    test::TestRequest::default()
      .method(Method::OPTIONS)
      .uri("/api/auth/login")
      .insert_header(("Origin", "http://localhost:3000"))
      .insert_header(("Access-Control-Request-Method", "POST"))
      .insert_header(("Access-Control-Request-Headers", "content-type"))
      .to_request(),
  )
  .await;
  assert!(resp.status().is_success());
  assert_eq!(
    resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
    "http://localhost:3000"
  );

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri("/api/health")
      .insert_header(("Origin", "http://evil.example"))
      .to_request(),
  )
  .await;
  assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[actix_rt::test]
async fn cors_allows_any_origin_when_unconfigured() {
  let state = test_state(Arc::new(MemoryStore::new()));
  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(state.clone()))
      .wrap(cors_middleware(&state.config))
      .configure(configure_app_routes),
  )
  .await;

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri("/api/health")
      .insert_header(("Origin", "http://localhost:3000"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some());
}

/// Delegates to a `MemoryStore` but refuses to delete carts.
struct CartDeleteFailingStore {
  inner: MemoryStore,
}

#[async_trait]
impl Store for CartDeleteFailingStore {
  async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    self.inner.find_user_by_id(id).await
  }
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.inner.find_user_by_email(email).await
  }
  async fn insert_user(&self, new_user: NewUser) -> Result<User> {
    self.inner.insert_user(new_user).await
  }
  async fn list_users(&self) -> Result<Vec<User>> {
    self.inner.list_users().await
  }
  async fn first_user_with_role(&self, role: Role) -> Result<Option<User>> {
    self.inner.first_user_with_role(role).await
  }
  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    self.inner.delete_user(id).await
  }
  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
    self.inner.list_products(filter).await
  }
  async fn list_products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> {
    self.inner.list_products_by_seller(seller_id).await
  }
  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.inner.find_product(id).await
  }
  async fn insert_product(&self, product: Product) -> Result<Product> {
    self.inner.insert_product(product).await
  }
  async fn update_product(&self, product: &Product) -> Result<Option<Product>> {
    self.inner.update_product(product).await
  }
  async fn set_product_rating(&self, id: Uuid, summary: RatingSummary) -> Result<Option<Product>> {
    self.inner.set_product_rating(id, summary).await
  }
  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    self.inner.delete_product(id).await
  }
  async fn replace_catalog(&self, products: Vec<Product>) -> Result<usize> {
    self.inner.replace_catalog(products).await
  }
  async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
    self.inner.find_cart(user_id).await
  }
  async fn save_cart(&self, cart: &Cart) -> Result<Cart> {
    self.inner.save_cart(cart).await
  }
  async fn delete_cart(&self, _user_id: Uuid) -> Result<bool> {
    Err(AppError::Internal("cart storage unavailable".to_string()))
  }
  async fn insert_order(&self, order: Order) -> Result<Order> {
    self.inner.insert_order(order).await
  }
  async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    self.inner.list_orders_for_user(user_id).await
  }
  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    self.inner.find_order(id).await
  }
  async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>> {
    self.inner.update_order_status(id, status).await
  }
  async fn find_review_by_user(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
    self.inner.find_review_by_user(product_id, user_id).await
  }
  async fn insert_review(&self, review: Review) -> Result<Review> {
    self.inner.insert_review(review).await
  }
  async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>> {
    self.inner.list_reviews(product_id).await
  }
  async fn insert_wishlist_entry(&self, entry: WishlistEntry) -> Result<WishlistEntry> {
    self.inner.insert_wishlist_entry(entry).await
  }
  async fn list_wishlist(&self) -> Result<Vec<WishlistEntry>> {
    self.inner.list_wishlist().await
  }
  async fn list_wishlist_for_user(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>> {
    self.inner.list_wishlist_for_user(user_id).await
  }
  async fn find_wishlist_entry(&self, id: Uuid) -> Result<Option<WishlistEntry>> {
    self.inner.find_wishlist_entry(id).await
  }
  async fn delete_wishlist_entry(&self, id: Uuid) -> Result<bool> {
    self.inner.delete_wishlist_entry(id).await
  }
  async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback> {
    self.inner.insert_feedback(feedback).await
  }
  async fn list_feedback(&self) -> Result<Vec<Feedback>> {
    self.inner.list_feedback().await
  }
}

#[actix_rt::test]
async fn failed_cart_clear_keeps_the_order_and_reports_500() {
  let inner = MemoryStore::new();
  let state = test_state(Arc::new(CartDeleteFailingStore { inner: inner.clone() }));
  let app = init_app!(state);
  let product = seller_with_product(&state, 4000).await;
  let (buyer, token) = buyer_token(&state, "flaky@example.com").await;

  let line = json!([{ "productId": product.id, "name": "Bowl", "priceCents": 4000, "quantity": 1 }]);
  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/orders")
      .insert_header(bearer(&token))
      .set_json(order_body(line))
  );
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "An internal error occurred");
  assert_eq!(inner.list_orders_for_user(buyer.id).await.unwrap().len(), 1);
}
