//! Auth types shared across Fusion crates.
//!
//! Provides JWT issuance and validation plus the `BearerToken` extractor.

pub mod bearer;
pub mod token;
