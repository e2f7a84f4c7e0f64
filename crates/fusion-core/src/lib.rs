//! Shared service plumbing: configuration, tracing, request ids and health probes.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
