//! Cart operation errors.
//!
//! These never leave the controller: each public operation converts them to a
//! [`Notification`](crate::notify::Notification) at its boundary.

use cart_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::snapshot::SnapshotError;
use crate::store::StoreError;

/// Why a cart operation did not mutate the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The catalog could not be reached or returned something unusable.
    #[error("catalog request failed: {0}")]
    Catalog(#[from] CatalogError),

    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotFound(ProductId),

    /// The requested amount exceeds available stock.
    #[error("product {product_id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    /// The requested amount is zero or negative.
    #[error("invalid quantity {0}")]
    InvalidQuantity(i64),

    /// The new cart could not be serialized.
    #[error("could not encode cart snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The new cart could not be persisted.
    #[error("could not persist cart: {0}")]
    Store(#[from] StoreError),
}

impl CartError {
    /// Whether this is an infrastructure fault worth reporting to Sentry,
    /// as opposed to an expected business rejection.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Catalog(_) | Self::Snapshot(_) | Self::Store(_))
    }
}

/// The three cart operations, used to pick the failure notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
}

impl Operation {
    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add_product",
            Self::Remove => "remove_product",
            Self::UpdateAmount => "update_product_amount",
        }
    }
}
