//! Integrations with external services.
//!
//! # Services
//!
//! - `auth` - Sign-in through the external identity provider

pub mod auth;

