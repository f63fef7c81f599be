//! User-facing notifications raised by the cart.
//!
//! Notifications are one-way signals to whatever presentation layer is
//! attached. The cart never waits on delivery and never learns whether a
//! notification was shown.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

use crate::cart::{CartError, Operation};

/// A condition the cart reports to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The requested quantity exceeds available stock.
    OutOfStock,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// A product was removed.
    RemoveSucceeded,
    /// Changing a product's quantity failed.
    UpdateFailed,
}

impl Notification {
    /// Map an operation failure to what the user is told.
    ///
    /// Out-of-stock keeps its own message; every other cause collapses into
    /// the operation's generic failure so the underlying reason is not shown.
    #[must_use]
    pub fn for_failure(operation: Operation, error: &CartError) -> Self {
        if matches!(error, CartError::OutOfStock { .. }) {
            return Self::OutOfStock;
        }
        match operation {
            Operation::Add => Self::AddFailed,
            Operation::Remove => Self::RemoveFailed,
            Operation::UpdateAmount => Self::UpdateFailed,
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Could not add product to cart",
            Self::RemoveFailed => "Could not remove product from cart",
            Self::RemoveSucceeded => "Product removed from cart",
            Self::UpdateFailed => "Could not change product quantity",
        }
    }

    /// Whether this reports a failure rather than a success.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::RemoveSucceeded)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives notifications. Delivery is fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!(?notification, "{}", notification.message());
        } else {
            tracing::info!(?notification, "{}", notification.message());
        }
    }
}

impl Notifier for UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        // A closed receiver means nobody is listening any more
        let _ = self.send(notification);
    }
}
