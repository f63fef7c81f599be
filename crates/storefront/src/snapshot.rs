//! Cart snapshot encoding.
//!
//! A snapshot is the serialized form of the cart written to the local store:
//!
//! ```json
//! {"version":1,"items":[{"id":1,"title":"...","price":"179.9","image":"...","amount":2}]}
//! ```
//!
//! Items keep cart order. [`decode`] also accepts the legacy unversioned form,
//! a bare array of items.

use std::collections::HashSet;

use cart_core::{Product, ProductId};
use serde::Serialize;
use thiserror::Error;

/// Version written by [`encode`].
pub const SNAPSHOT_VERSION: u64 = 1;

/// Errors that can occur encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Not valid JSON, or items do not match the product schema.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Written by a newer release.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u64),

    /// Neither an envelope nor a legacy array.
    #[error("snapshot is neither a versioned object nor an array")]
    UnrecognizedShape,

    /// The same product appears twice.
    #[error("duplicate product {0} in snapshot")]
    DuplicateId(ProductId),

    /// A product is held with amount zero.
    #[error("product {0} has amount 0")]
    InvalidAmount(ProductId),
}

#[derive(Serialize)]
struct Envelope<'a> {
    version: u64,
    items: &'a [Product],
}

/// Serialize the cart.
///
/// # Errors
///
/// Returns `SnapshotError::Json` if serialization fails.
pub fn encode(items: &[Product]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&Envelope {
        version: SNAPSHOT_VERSION,
        items,
    })?)
}

/// Deserialize and validate a stored cart.
///
/// # Errors
///
/// Returns `SnapshotError` if the text is malformed, from an unknown version,
/// or violates the cart invariants (unique ids, amounts of at least 1).
pub fn decode(text: &str) -> Result<Vec<Product>, SnapshotError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let items: Vec<Product> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        serde_json::Value::Object(mut object) => {
            let version = object
                .get("version")
                .and_then(serde_json::Value::as_u64)
                .ok_or(SnapshotError::UnrecognizedShape)?;
            if version != SNAPSHOT_VERSION {
                return Err(SnapshotError::UnsupportedVersion(version));
            }
            let items = object
                .remove("items")
                .ok_or(SnapshotError::UnrecognizedShape)?;
            serde_json::from_value(items)?
        }
        _ => return Err(SnapshotError::UnrecognizedShape),
    };

    validate(&items)?;
    Ok(items)
}

fn validate(items: &[Product]) -> Result<(), SnapshotError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.amount == 0 {
            return Err(SnapshotError::InvalidAmount(item.id));
        }
        if !seen.insert(item.id) {
            return Err(SnapshotError::DuplicateId(item.id));
        }
    }
    Ok(())
}
