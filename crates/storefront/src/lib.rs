//! Voyager storefront library.
//!
//! Server-rendered ordering site: catalog browsing, a cookie-held basket,
//! sign-in through an external identity provider and the signed-in user's
//! order history from Firestore.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod firestore;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
