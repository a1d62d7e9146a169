//! Voyager Core - Shared domain types.
//!
//! This crate provides the types used by every Voyager component:
//! - `storefront` - Public-facing ordering site
//! - `cli` - Command-line tools for migrations and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! database access, no HTTP clients. The basket store lives here so it can be
//! exercised without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, the basket and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
