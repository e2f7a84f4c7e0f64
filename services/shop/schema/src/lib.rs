//! sea-orm entities for the shop database.

pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod favorites;
pub mod order_items;
pub mod orders;
pub mod permissions;
pub mod product_categories;
pub mod products;
pub mod reviews;
pub mod sessions;
pub mod user_permissions;
pub mod users;
pub mod verifications;
