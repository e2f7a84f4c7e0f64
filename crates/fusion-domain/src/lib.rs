//! Domain types shared across the Fusion crates.
//!
//! Pure types with no framework dependencies: order lifecycle, permission
//! tags, verification kinds and pagination.

pub mod order_status;
pub mod pagination;
pub mod permission;
pub mod verification;
