//! CLI command implementations.

pub mod catalog;
pub mod migrate;
pub mod orders;
