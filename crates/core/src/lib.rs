//! Storefront cart core - Shared types library.
//!
//! This crate provides the domain types used by the cart components:
//! - `storefront` - Cart controller, catalog client and catalog view
//! - `integration-tests` - End-to-end tests against a fake catalog service
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices with locale formatting, products and stock

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
