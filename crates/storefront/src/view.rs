//! Product catalog view.
//!
//! Lists the catalog with formatted prices and how many of each product are
//! already in the cart. Owns no cart logic: reads come from the controller
//! and the add action delegates to [`CartController::add_product`].

use std::collections::HashMap;

use cart_core::{CatalogProduct, CurrencyCode, Product, ProductId};

use crate::cart::CartController;
use crate::catalog::{Catalog, CatalogError};

/// Fold the cart into product id -> quantity. Later entries win.
#[must_use]
pub fn cart_quantities(cart: &[Product]) -> HashMap<ProductId, u32> {
    cart.iter().fold(HashMap::new(), |mut acc, product| {
        acc.insert(product.id, product.amount);
        acc
    })
}

/// A catalog entry ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub formatted_price: String,
}

impl ProductListing {
    fn new(product: CatalogProduct, currency: CurrencyCode) -> Self {
        Self {
            formatted_price: product.price.format(currency),
            id: product.id,
            title: product.title,
            image: product.image,
        }
    }
}

/// A listing paired with its current quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub listing: ProductListing,
    pub in_cart: u32,
}

/// The catalog listing bound to a cart.
pub struct CatalogView<C> {
    cart: CartController<C>,
    listings: Vec<ProductListing>,
}

impl<C: Catalog> CatalogView<C> {
    /// Fetch the catalog once and format its prices.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the listing cannot be fetched.
    pub async fn load(cart: CartController<C>, currency: CurrencyCode) -> Result<Self, CatalogError> {
        let listings = cart
            .catalog()
            .products()
            .await?
            .into_iter()
            .map(|product| ProductListing::new(product, currency))
            .collect::<Vec<_>>();
        tracing::debug!(products = listings.len(), "Catalog view loaded");

        Ok(Self { cart, listings })
    }

    /// The listings, in catalog order.
    #[must_use]
    pub fn listings(&self) -> &[ProductListing] {
        &self.listings
    }

    /// Listings with the cart's current quantities.
    #[must_use]
    pub fn cards(&self) -> Vec<ProductCard> {
        let quantities = cart_quantities(&self.cart.cart());
        self.listings
            .iter()
            .map(|listing| ProductCard {
                in_cart: quantities.get(&listing.id).copied().unwrap_or(0),
                listing: listing.clone(),
            })
            .collect()
    }

    /// The add-to-cart action.
    pub async fn add(&self, product_id: ProductId) {
        self.cart.add_product(product_id).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use cart_core::Price;
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::fake::FakeCatalog;
    use crate::notify::TracingNotifier;
    use crate::store::MemoryStore;

    fn product(id: i32, amount: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: String::new(),
            price: Price::zero(),
            image: String::new(),
            amount,
        }
    }

    fn controller(catalog: FakeCatalog) -> CartController<FakeCatalog> {
        CartController::open(
            catalog,
            Arc::new(MemoryStore::new()),
            Arc::new(TracingNotifier),
            "cart",
        )
        .unwrap()
    }

    #[test]
    fn test_cart_quantities() {
        let quantities = cart_quantities(&[product(1, 2), product(3, 1)]);
        assert_eq!(quantities.len(), 2);
        assert_eq!(quantities[&ProductId::new(1)], 2);
        assert_eq!(quantities[&ProductId::new(3)], 1);
        assert!(cart_quantities(&[]).is_empty());
    }

    #[test]
    fn test_cart_quantities_later_entries_win() {
        let quantities = cart_quantities(&[product(1, 2), product(1, 5)]);
        assert_eq!(quantities[&ProductId::new(1)], 5);
    }

    #[tokio::test]
    async fn test_load_formats_prices_in_catalog_order() {
        let catalog = FakeCatalog::new()
            .with_product(2, 13990, 1)
            .with_product(1, 123_450, 1);
        let view = CatalogView::load(controller(catalog), CurrencyCode::BRL)
            .await
            .unwrap();

        let prices: Vec<_> = view
            .listings()
            .iter()
            .map(|l| (l.id.as_i32(), l.formatted_price.as_str()))
            .collect();
        assert_eq!(prices, vec![(2, "R$ 139,90"), (1, "R$ 1.234,50")]);
    }

    #[tokio::test]
    async fn test_add_updates_cards() {
        let catalog = FakeCatalog::new()
            .with_product(1, 1000, 5)
            .with_product(2, 2000, 5);
        let view = CatalogView::load(controller(catalog), CurrencyCode::USD)
            .await
            .unwrap();

        view.add(ProductId::new(2)).await;
        view.add(ProductId::new(2)).await;

        let in_cart: Vec<_> = view.cards().iter().map(|c| c.in_cart).collect();
        assert_eq!(in_cart, vec![0, 2]);
        assert_eq!(view.cards()[1].listing.formatted_price, "$20.00");
    }

    #[tokio::test]
    async fn test_load_propagates_catalog_failure() {
        let catalog = FakeCatalog::new();
        catalog.set_offline(true);
        assert!(CatalogView::load(controller(catalog), CurrencyCode::USD).await.is_err());
    }

    #[test]
    fn test_price_formatting_uses_decimal() {
        let listing = ProductListing::new(
            CatalogProduct {
                id: ProductId::new(1),
                title: "Shoe".to_string(),
                price: Price::new(Decimal::new(999, 2)),
                image: String::new(),
            },
            CurrencyCode::GBP,
        );
        assert_eq!(listing.formatted_price, "£9.99");
    }
}
