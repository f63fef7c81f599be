//! Cart controller.
//!
//! [`CartController`] owns the authoritative in-memory cart and keeps it in
//! step with the snapshot in the local store. It exposes three operations:
//!
//! - [`add_product`](CartController::add_product)
//! - [`remove_product`](CartController::remove_product)
//! - [`update_product_amount`](CartController::update_product_amount)
//!
//! None of them return an error. Each runs to completion and reports any
//! failure through the attached [`Notifier`]; on failure the cart and the
//! store are left exactly as they were.
//!
//! # Concurrency
//!
//! An operation reads the cart when it starts, may suspend on catalog I/O,
//! then replaces the whole cart. Operations are not serialized against each
//! other, so two in flight at once race and the last to commit wins.

mod error;

use std::sync::Arc;

use cart_core::{Price, Product, ProductId};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub use error::{CartError, Operation};

use crate::catalog::Catalog;
use crate::notify::{Notification, Notifier};
use crate::snapshot;
use crate::store::{LocalStore, StoreError};

/// Request to set a product's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateAmount {
    pub product_id: ProductId,
    /// Desired quantity. Zero or negative is rejected.
    pub amount: i64,
}

/// Shared handle to the cart.
///
/// Cheaply cloneable via `Arc`; every clone operates on the same cart.
pub struct CartController<C> {
    inner: Arc<CartControllerInner<C>>,
}

struct CartControllerInner<C> {
    catalog: C,
    store: Arc<dyn LocalStore>,
    notifier: Arc<dyn Notifier>,
    key: String,
    cart: watch::Sender<Arc<[Product]>>,
}

impl<C> Clone for CartController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Catalog> CartController<C> {
    /// Load the cart from `store` under `key` and build a controller around it.
    ///
    /// A missing key starts an empty cart. A snapshot that cannot be decoded is
    /// logged and also starts an empty cart; the next successful mutation
    /// overwrites it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store itself cannot be read.
    pub fn open(
        catalog: C,
        store: Arc<dyn LocalStore>,
        notifier: Arc<dyn Notifier>,
        key: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let key = key.into();
        let items = match store.get(&key)? {
            None => Vec::new(),
            Some(text) => snapshot::decode(&text).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Discarding unreadable cart snapshot");
                Vec::new()
            }),
        };
        info!(key = %key, items = items.len(), "Cart loaded");

        let (cart, _) = watch::channel(Arc::from(items));

        Ok(Self {
            inner: Arc::new(CartControllerInner {
                catalog,
                store,
                notifier,
                key,
                cart,
            }),
        })
    }

    /// The current cart, in insertion order.
    #[must_use]
    pub fn cart(&self) -> Arc<[Product]> {
        Arc::clone(&self.inner.cart.borrow())
    }

    /// Watch the cart; the receiver wakes on every committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<[Product]>> {
        self.inner.cart.subscribe()
    }

    /// The catalog this controller validates against.
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.inner.catalog
    }

    /// Sum of all amounts in the cart.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart().iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart().iter().map(Product::subtotal).sum()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented only while its amount is
    /// below the current stock. A product not yet in the cart is fetched and
    /// inserted with amount 1; stock is not consulted on that path.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let result = self.try_add_product(product_id).await;
        self.settle(Operation::Add, result);
    }

    /// Remove a product entirely. Reports success or a generic failure.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) {
        match self.try_remove_product(product_id) {
            Ok(()) => self.inner.notifier.notify(Notification::RemoveSucceeded),
            Err(e) => self.report(Operation::Remove, &e),
        }
    }

    /// Set a product's amount, bounded by current stock.
    ///
    /// Success is silent. An amount of zero or less is reported as a failure.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(&self, update: UpdateAmount) {
        let result = self.try_update_product_amount(update).await;
        self.settle(Operation::UpdateAmount, result);
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut items = self.cart().to_vec();
        let stock = self.inner.catalog.stock(product_id).await?;

        let existing = items.iter_mut().find(|p| p.id == product_id);
        if let Some(existing) = existing {
            let requested = existing.amount.saturating_add(1);
            if requested > stock.amount {
                return Err(CartError::OutOfStock {
                    product_id,
                    requested: i64::from(requested),
                    available: stock.amount,
                });
            }
            existing.amount = requested;
        } else {
            let product = self.inner.catalog.product(product_id).await?;
            items.push(Product::from_catalog(product));
        }

        self.commit(items)
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut items = self.cart().to_vec();
        let before = items.len();
        items.retain(|p| p.id != product_id);
        if items.len() == before {
            return Err(CartError::NotFound(product_id));
        }

        self.commit(items)
    }

    async fn try_update_product_amount(&self, update: UpdateAmount) -> Result<(), CartError> {
        let UpdateAmount { product_id, amount } = update;
        if amount <= 0 {
            return Err(CartError::InvalidQuantity(amount));
        }

        let mut items = self.cart().to_vec();
        if !items.iter().any(|p| p.id == product_id) {
            return Err(CartError::NotFound(product_id));
        }

        let stock = self.inner.catalog.stock(product_id).await?;
        if amount > i64::from(stock.amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        // Bounded by a u32 stock level above
        let amount = u32::try_from(amount).map_err(|_| CartError::InvalidQuantity(amount))?;
        for item in items.iter_mut().filter(|p| p.id == product_id) {
            item.amount = amount;
        }

        self.commit(items)
    }

    /// Persist `items`, then publish them. Nothing changes if persisting fails.
    fn commit(&self, items: Vec<Product>) -> Result<(), CartError> {
        let text = snapshot::encode(&items)?;
        self.inner.store.set(&self.inner.key, &text)?;

        debug!(items = items.len(), "Cart committed");
        self.inner.cart.send_replace(Arc::from(items));
        Ok(())
    }

    fn settle(&self, operation: Operation, result: Result<(), CartError>) {
        if let Err(e) = result {
            self.report(operation, &e);
        }
    }

    /// Log the real cause, then tell the user the generalized one.
    fn report(&self, operation: Operation, error: &CartError) {
        if error.is_fault() {
            let event_id = sentry::capture_error(error);
            warn!(
                operation = operation.as_str(),
                error = %error,
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        } else {
            info!(
                operation = operation.as_str(),
                error = %error,
                "Cart operation rejected"
            );
        }

        self.inner
            .notifier
            .notify(Notification::for_failure(operation, error));
    }
}
