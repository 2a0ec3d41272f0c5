// artisan_market/src/services/seed.rs

//! Startup seeding behind `SEED_DB=true`.

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::product::Product;
use crate::models::user::{normalize_email, NewUser, Role};
use crate::services::auth_service;
use crate::store::Store;
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// (name, price in cents, image, rating)
const DEMO_PRODUCTS: &[(&str, i64, &str, f64)] = &[
  ("Handcrafted Wooden Bowl", 2500, "https://placehold.co/300x200/E0E7FF/4338CA?text=Wooden+Bowl", 4.5),
  ("Knitted Scarf", 3500, "https://placehold.co/300x200/D1FAE5/065F46?text=Knitted+Scarf", 4.8),
  ("Ceramic Mug", 1800, "https://placehold.co/300x200/FEE2E2/991B1B?text=Ceramic+Mug", 4.2),
  ("Custom Leather Wallet", 5000, "https://placehold.co/300x200/FFFBEB/92400E?text=Leather+Wallet", 4.7),
  ("Artisanal Soap Set", 1500, "https://placehold.co/300x200/DBEAFE/1E40AF?text=Artisanal+Soap", 4.6),
  ("Hand-painted Canvas", 7500, "https://placehold.co/300x200/E0F2F1/0F766E?text=Painted+Canvas", 4.9),
];

const DEMO_CATEGORY: &str = "General";
const DEMO_STOCK: i32 = 25;

#[derive(Debug, Default, PartialEq)]
pub struct SeedReport {
  pub admin_created: bool,
  pub products_inserted: usize,
}

#[instrument(name = "seed::run", skip_all, err(Display))]
pub async fn run(store: &dyn Store, config: &AppConfig) -> Result<SeedReport> {
  let mut report = SeedReport::default();

  if let (Some(email), Some(password)) = (&config.seed_admin_email, &config.seed_admin_password) {
    report.admin_created = ensure_admin(store, email, password).await?;
  }

  let Some(seller) = store.first_user_with_role(Role::Seller).await? else {
    warn!("No seller account found; register a seller before seeding the catalog.");
    return Ok(report);
  };

  report.products_inserted = store.replace_catalog(demo_catalog(seller.id)).await?;
  info!(seller_id = %seller.id, products = report.products_inserted, "Demo catalog seeded.");
  Ok(report)
}

async fn ensure_admin(store: &dyn Store, email: &str, password: &str) -> Result<bool> {
  let email = normalize_email(email);
  if store.find_user_by_email(&email).await?.is_some() {
    info!(%email, "Seed admin already exists.");
    return Ok(false);
  }
  let password_hash = auth_service::hash_password(password)?;
  let admin = store
    .insert_user(NewUser {
      name: "Administrator".to_string(),
      email,
      password_hash,
      role: Role::Admin,
    })
    .await?;
  info!(user_id = %admin.id, "Seed admin created.");
  Ok(true)
}

/// Demo listings carry a preset rating but no reviews behind it.
pub fn demo_catalog(seller_id: Uuid) -> Vec<Product> {
  DEMO_PRODUCTS
    .iter()
    .map(|(name, price_cents, image_url, rating)| Product {
      id: Uuid::new_v4(),
      name: (*name).to_string(),
      description: format!("A beautiful {}.", name.to_lowercase()),
      price_cents: *price_cents,
      image_url: (*image_url).to_string(),
      category: DEMO_CATEGORY.to_string(),
      seller_id,
      rating: *rating,
      num_reviews: 0,
      count_in_stock: DEMO_STOCK,
      created_at: Utc::now(),
    })
    .collect()
}
