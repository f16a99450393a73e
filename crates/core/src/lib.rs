//! Storefront
//!
//! Client-side shopping cart for the storefront: cart contents keyed by
//! product and size, catalog pricing, persistence to a local key/value store,
//! and checkout through a pluggable order submitter.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod storage;
pub mod store;
pub mod submission;
