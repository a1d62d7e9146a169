//! Core types for Voyager.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod basket;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;

pub use basket::{Basket, BasketItem, BasketLine};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::Order;
pub use price::{CurrencyCode, Price};
pub use product::{Category, Product};
