//! Catalog service access.
//!
//! # Architecture
//!
//! - The catalog service is read-only and the source of truth for products
//!   and stock levels
//! - [`Catalog`] is the seam the cart controller depends on, so tests can
//!   substitute an in-memory catalog
//! - [`CatalogClient`] talks to the REST endpoints over `reqwest` and caches
//!   product reads via `moka` (stock is never cached)
//!
//! # Endpoints
//!
//! - `GET /products` - full listing
//! - `GET /products/{id}` - single product
//! - `GET /stock/{id}` - available quantity
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_storefront::catalog::{Catalog, CatalogClient};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let stock = client.stock(ProductId::new(1)).await?;
//! ```

mod cache;
mod client;
#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use cart_core::{CatalogProduct, ProductId, Stock};
use thiserror::Error;

pub use client::CatalogClient;

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured API token is not a valid header value.
    #[error("invalid API token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    /// An endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read access to the remote catalog.
pub trait Catalog: Send + Sync + 'static {
    /// Fetch the full product listing, in catalog order.
    fn products(&self) -> impl Future<Output = Result<Vec<CatalogProduct>, CatalogError>> + Send;

    /// Fetch a single product record.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, CatalogError>> + Send;

    /// Fetch the current stock level for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("stock/9".to_string());
        assert_eq!(err.to_string(), "Not found: stock/9");

        let err = CatalogError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "catalog returned HTTP 502: bad gateway");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
