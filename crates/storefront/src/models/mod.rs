//! Domain models for storefront.
//!
//! Catalog, basket and order types live in `voyager-core`; this module only
//! holds what the storefront keeps in the session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
