//! Storefront cart library.
//!
//! This crate provides the cart controller and its collaborators as a
//! library, allowing them to be tested and embedded behind any front end.
//!
//! # Modules
//!
//! - [`cart`] - The cart controller: add, remove and update operations
//! - [`catalog`] - Catalog service trait and REST client
//! - [`store`] - Persistent local key-value store
//! - [`snapshot`] - Versioned cart serialization
//! - [`notify`] - User-facing notifications
//! - [`view`] - Product catalog view with in-cart quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod snapshot;
pub mod store;
pub mod view;

pub use cart::{CartController, UpdateAmount};
pub use catalog::{Catalog, CatalogClient, CatalogError};
pub use notify::{Notification, Notifier, TracingNotifier};
pub use store::{FileStore, LocalStore, MemoryStore};
pub use view::CatalogView;
