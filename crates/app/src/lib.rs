//! Storefront application services: configuration, logging, the API client,
//! and the context that owns the session cart.

pub mod api;
pub mod config;
pub mod context;
pub mod observability;
pub mod render;
