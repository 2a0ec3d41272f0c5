// artisan_market/src/store/postgres.rs

//! PostgreSQL store. Cart lines, order lines and shipping addresses live in
//! JSONB columns so a cart or order is read and written as one document.

use super::Store;
use crate::errors::{AppError, Result};
use crate::models::review::RatingSummary;
use crate::models::{
  Cart, CartLine, Feedback, NewUser, Order, OrderLine, OrderStatus, Product, ProductFilter, Review, Role,
  ShippingAddress, User, WishlistEntry,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Idempotent; run on every start.
const SCHEMA: &[&str] = &[
  "DO $$ BEGIN CREATE TYPE user_role AS ENUM ('buyer', 'seller', 'admin'); \
   EXCEPTION WHEN duplicate_object THEN NULL; END $$",
  "DO $$ BEGIN CREATE TYPE order_status AS ENUM ('processing', 'shipped', 'delivered'); \
   EXCEPTION WHEN duplicate_object THEN NULL; END $$",
  "CREATE TABLE IF NOT EXISTS users (
     id UUID PRIMARY KEY,
     name TEXT NOT NULL,
     email TEXT NOT NULL UNIQUE,
     password_hash TEXT NOT NULL,
     role user_role NOT NULL DEFAULT 'buyer',
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
   )",
  "CREATE TABLE IF NOT EXISTS products (
     id UUID PRIMARY KEY,
     name TEXT NOT NULL,
     description TEXT NOT NULL,
     price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
     image_url TEXT NOT NULL,
     category TEXT NOT NULL,
     seller_id UUID NOT NULL,
     rating DOUBLE PRECISION NOT NULL DEFAULT 0,
     num_reviews INTEGER NOT NULL DEFAULT 0,
     count_in_stock INTEGER NOT NULL DEFAULT 0 CHECK (count_in_stock >= 0),
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
   )",
  "CREATE INDEX IF NOT EXISTS products_seller_idx ON products (seller_id)",
  "CREATE TABLE IF NOT EXISTS carts (
     id UUID PRIMARY KEY,
     user_id UUID NOT NULL UNIQUE,
     items JSONB NOT NULL DEFAULT '[]'::jsonb,
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
   )",
  "CREATE TABLE IF NOT EXISTS orders (
     id UUID PRIMARY KEY,
     user_id UUID NOT NULL,
     order_items JSONB NOT NULL,
     shipping_address JSONB NOT NULL,
     payment_method TEXT NOT NULL,
     tax_price_cents BIGINT NOT NULL DEFAULT 0,
     shipping_price_cents BIGINT NOT NULL DEFAULT 0,
     total_price_cents BIGINT NOT NULL,
     status order_status NOT NULL DEFAULT 'processing',
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
   )",
  "CREATE INDEX IF NOT EXISTS orders_user_idx ON orders (user_id, created_at DESC)",
  "CREATE TABLE IF NOT EXISTS reviews (
     id UUID PRIMARY KEY,
     product_id UUID NOT NULL,
     user_id UUID NOT NULL,
     name TEXT NOT NULL,
     rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
     comment TEXT NOT NULL DEFAULT '',
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
   )",
  "CREATE INDEX IF NOT EXISTS reviews_product_idx ON reviews (product_id)",
  "CREATE TABLE IF NOT EXISTS wishlist_entries (
     id UUID PRIMARY KEY,
     user_id UUID NOT NULL,
     user_name TEXT NOT NULL,
     user_email TEXT NOT NULL,
     product_name TEXT NOT NULL,
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
   )",
  "CREATE TABLE IF NOT EXISTS feedback (
     id UUID PRIMARY KEY,
     user_id UUID NOT NULL,
     name TEXT NOT NULL,
     email TEXT NOT NULL,
     message TEXT NOT NULL,
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
   )",
];

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";
const PRODUCT_COLUMNS: &str =
  "id, name, description, price_cents, image_url, category, seller_id, rating, num_reviews, count_in_stock, created_at";
const CART_COLUMNS: &str = "id, user_id, items, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, user_id, order_items, shipping_address, payment_method, tax_price_cents, \
   shipping_price_cents, total_price_cents, status, created_at";
const REVIEW_COLUMNS: &str = "id, product_id, user_id, name, rating, comment, created_at";
const WISHLIST_COLUMNS: &str = "id, user_id, user_name, user_email, product_name, created_at";
const FEEDBACK_COLUMNS: &str = "id, user_id, name, email, message, created_at";

#[derive(FromRow)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  items: Json<Vec<CartLine>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
  fn from(row: CartRow) -> Self {
    Cart {
      id: row.id,
      user_id: row.user_id,
      items: row.items.0,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  order_items: Json<Vec<OrderLine>>,
  shipping_address: Json<ShippingAddress>,
  payment_method: String,
  tax_price_cents: i64,
  shipping_price_cents: i64,
  total_price_cents: i64,
  status: OrderStatus,
  created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
  fn from(row: OrderRow) -> Self {
    Order {
      id: row.id,
      user_id: row.user_id,
      order_items: row.order_items.0,
      shipping_address: row.shipping_address.0,
      payment_method: row.payment_method,
      tax_price_cents: row.tax_price_cents,
      shipping_price_cents: row.shipping_price_cents,
      total_price_cents: row.total_price_cents,
      status: row.status,
      created_at: row.created_at,
    }
  }
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(10)
      .connect(database_url)
      .await
      .map_err(|e| {
        error!(error = %e, "Failed to connect to the database.");
        AppError::Sqlx(e)
      })?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  #[instrument(name = "pg_store::ensure_schema", skip(self), err(Display))]
  pub async fn ensure_schema(&self) -> Result<()> {
    for statement in SCHEMA {
      sqlx::query(*statement).execute(&self.pool).await?;
    }
    info!(statements = SCHEMA.len(), "Database schema is in place.");
    Ok(())
  }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
  matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
  async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
  }

  async fn insert_user(&self, new_user: NewUser) -> Result<User> {
    let user = new_user.into_user();
    let sql = format!(
      "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
      .bind(user.id)
      .bind(&user.name)
      .bind(&user.email)
      .bind(&user.password_hash)
      .bind(user.role)
      .bind(user.created_at)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          AppError::Validation("An account with this email already exists.".to_string())
        } else {
          AppError::Sqlx(e)
        }
      })
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
  }

  async fn first_user_with_role(&self, role: Role) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at ASC LIMIT 1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(role).fetch_optional(&self.pool).await?)
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;
    Ok(result.rows_affected() > 0)
  }

  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
    // strpos keeps the keyword literal; LIKE would treat % and _ as wildcards.
    let sql = format!(
      "SELECT {PRODUCT_COLUMNS} FROM products \
       WHERE ($1::text IS NULL OR strpos(lower(name), lower($1)) > 0) \
       AND ($2::text IS NULL OR category = $2) \
       ORDER BY created_at DESC"
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(filter.keyword.as_deref())
        .bind(filter.category.as_deref())
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn list_products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 ORDER BY created_at DESC");
    Ok(sqlx::query_as::<_, Product>(&sql).bind(seller_id).fetch_all(&self.pool).await?)
  }

  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    Ok(sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn insert_product(&self, product: Product) -> Result<Product> {
    let sql = format!(
      "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
       RETURNING {PRODUCT_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image_url)
        .bind(&product.category)
        .bind(product.seller_id)
        .bind(product.rating)
        .bind(product.num_reviews)
        .bind(product.count_in_stock)
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn update_product(&self, product: &Product) -> Result<Option<Product>> {
    let sql = format!(
      "UPDATE products SET name = $2, description = $3, price_cents = $4, image_url = $5, category = $6, \
       count_in_stock = $7 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image_url)
        .bind(&product.category)
        .bind(product.count_in_stock)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn set_product_rating(&self, id: Uuid, summary: RatingSummary) -> Result<Option<Product>> {
    let sql = format!("UPDATE products SET rating = $2, num_reviews = $3 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(summary.rating)
        .bind(summary.num_reviews)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
    Ok(result.rows_affected() > 0)
  }

  async fn replace_catalog(&self, products: Vec<Product>) -> Result<usize> {
    let mut tx = self.pool.begin().await?;
    sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
    let sql = format!(
      "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
    );
    for product in &products {
      sqlx::query(&sql)
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image_url)
        .bind(&product.category)
        .bind(product.seller_id)
        .bind(product.rating)
        .bind(product.num_reviews)
        .bind(product.count_in_stock)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(products.len())
  }

  async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
    let sql = format!("SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1");
    let row = sqlx::query_as::<_, CartRow>(&sql).bind(user_id).fetch_optional(&self.pool).await?;
    Ok(row.map(Cart::from))
  }

  async fn save_cart(&self, cart: &Cart) -> Result<Cart> {
    let sql = format!(
      "INSERT INTO carts ({CART_COLUMNS}) VALUES ($1, $2, $3, $4, NOW()) \
       ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = NOW() \
       RETURNING {CART_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CartRow>(&sql)
      .bind(cart.id)
      .bind(cart.user_id)
      .bind(Json(&cart.items))
      .bind(cart.created_at)
      .fetch_one(&self.pool)
      .await?;
    Ok(row.into())
  }

  async fn delete_cart(&self, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM carts WHERE user_id = $1").bind(user_id).execute(&self.pool).await?;
    Ok(result.rows_affected() > 0)
  }

  async fn insert_order(&self, order: Order) -> Result<Order> {
    let sql = format!(
      "INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {ORDER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(order.id)
      .bind(order.user_id)
      .bind(Json(&order.order_items))
      .bind(Json(&order.shipping_address))
      .bind(&order.payment_method)
      .bind(order.tax_price_cents)
      .bind(order.shipping_price_cents)
      .bind(order.total_price_cents)
      .bind(order.status)
      .bind(order.created_at)
      .fetch_one(&self.pool)
      .await?;
    Ok(row.into())
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, OrderRow>(&sql).bind(user_id).fetch_all(&self.pool).await?;
    Ok(rows.into_iter().map(Order::from).collect())
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    let row = sqlx::query_as::<_, OrderRow>(&sql).bind(id).fetch_optional(&self.pool).await?;
    Ok(row.map(Order::from))
  }

  async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>> {
    let sql = format!("UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(id)
      .bind(status)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  async fn find_review_by_user(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = $1 AND user_id = $2 LIMIT 1");
    Ok(
      sqlx::query_as::<_, Review>(&sql)
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn insert_review(&self, review: Review) -> Result<Review> {
    let sql = format!(
      "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {REVIEW_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Review>(&sql)
        .bind(review.id)
        .bind(review.product_id)
        .bind(review.user_id)
        .bind(&review.name)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = $1 ORDER BY created_at DESC");
    Ok(sqlx::query_as::<_, Review>(&sql).bind(product_id).fetch_all(&self.pool).await?)
  }

  async fn insert_wishlist_entry(&self, entry: WishlistEntry) -> Result<WishlistEntry> {
    let sql = format!(
      "INSERT INTO wishlist_entries ({WISHLIST_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {WISHLIST_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, WishlistEntry>(&sql)
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.user_email)
        .bind(&entry.product_name)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn list_wishlist(&self) -> Result<Vec<WishlistEntry>> {
    let sql = format!("SELECT {WISHLIST_COLUMNS} FROM wishlist_entries ORDER BY created_at DESC");
    Ok(sqlx::query_as::<_, WishlistEntry>(&sql).fetch_all(&self.pool).await?)
  }

  async fn list_wishlist_for_user(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>> {
    let sql = format!("SELECT {WISHLIST_COLUMNS} FROM wishlist_entries WHERE user_id = $1 ORDER BY created_at DESC");
    Ok(sqlx::query_as::<_, WishlistEntry>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn find_wishlist_entry(&self, id: Uuid) -> Result<Option<WishlistEntry>> {
    let sql = format!("SELECT {WISHLIST_COLUMNS} FROM wishlist_entries WHERE id = $1");
    Ok(sqlx::query_as::<_, WishlistEntry>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn delete_wishlist_entry(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM wishlist_entries WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback> {
    let sql = format!(
      "INSERT INTO feedback ({FEEDBACK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {FEEDBACK_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Feedback>(&sql)
        .bind(feedback.id)
        .bind(feedback.user_id)
        .bind(&feedback.name)
        .bind(&feedback.email)
        .bind(&feedback.message)
        .bind(feedback.created_at)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn list_feedback(&self) -> Result<Vec<Feedback>> {
    let sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback ORDER BY created_at DESC");
    Ok(sqlx::query_as::<_, Feedback>(&sql).fetch_all(&self.pool).await?)
  }
}
