//! Catalog products, cart entries and stock levels.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as listed by the catalog service (`GET /products`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// A product held in the cart.
///
/// Identity is `id`; `amount` is the quantity in the cart and is never zero
/// for an entry that is actually in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub amount: u32,
}

impl Product {
    /// Build a fresh cart entry from a catalog record with an amount of 1.
    #[must_use]
    pub fn from_catalog(product: CatalogProduct) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: 1,
        }
    }

    /// Price multiplied by amount.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price * self.amount
    }
}

/// Remote-authoritative available quantity for a product (`GET /stock/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_catalog_product_from_service_json() {
        let json = r#"{
            "id": 1,
            "title": "Running shoe",
            "price": 179.9,
            "image": "https://cdn.example.com/shoe.jpg"
        }"#;
        let product: CatalogProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::new(Decimal::new(17990, 2)));
    }

    #[test]
    fn test_from_catalog_starts_at_one() {
        let product = Product::from_catalog(CatalogProduct {
            id: ProductId::new(2),
            title: "Sneaker".to_string(),
            price: Price::new(Decimal::new(9990, 2)),
            image: "https://cdn.example.com/sneaker.jpg".to_string(),
        });
        assert_eq!(product.amount, 1);
        assert_eq!(product.id, ProductId::new(2));
    }

    #[test]
    fn test_subtotal() {
        let product = Product {
            id: ProductId::new(3),
            title: "Boot".to_string(),
            price: Price::new(Decimal::new(5050, 2)),
            image: String::new(),
            amount: 3,
        };
        assert_eq!(product.subtotal(), Price::new(Decimal::new(15150, 2)));
    }

    #[test]
    fn test_stock_rejects_negative_amount() {
        assert!(serde_json::from_str::<Stock>(r#"{"id":1,"amount":-1}"#).is_err());
        let stock: Stock = serde_json::from_str(r#"{"id":1,"amount":5}"#).unwrap();
        assert_eq!(stock.amount, 5);
    }
}
