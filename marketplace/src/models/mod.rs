// artisan_market/src/models/mod.rs

//! Records kept in the store, plus the request payloads that create or change them.

pub mod cart;
pub mod feedback;
pub mod order;
pub mod product;
pub mod review;
pub mod user;
pub mod wishlist;

pub use cart::{Cart, CartLine};
pub use feedback::{Feedback, NewFeedback};
pub use order::{NewOrder, Order, OrderLine, OrderStatus, ShippingAddress};
pub use product::{NewProduct, Product, ProductFilter, ProductUpdate};
pub use review::{NewReview, RatingSummary, Review};
pub use user::{NewUser, Role, User};
pub use wishlist::{NewWishlistEntry, WishlistEntry};
