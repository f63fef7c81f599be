//! In-memory catalog for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cart_core::{CatalogProduct, Price, ProductId, Stock};
use rust_decimal::Decimal;
use tokio::sync::Barrier;

use super::{Catalog, CatalogError};

/// A catalog held in memory, with a switch to simulate the service being down.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    products: Mutex<Vec<CatalogProduct>>,
    stock: Mutex<HashMap<ProductId, u32>>,
    offline: AtomicBool,
    stock_calls: AtomicUsize,
    stock_gate: Mutex<Option<Arc<Barrier>>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product priced at `cents / 100` with `stock` units available.
    pub fn with_product(self, id: i32, cents: i64, stock: u32) -> Self {
        let id = ProductId::new(id);
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CatalogProduct {
                id,
                title: format!("Shoe {id}"),
                price: Price::new(Decimal::new(cents, 2)),
                image: format!("https://cdn.example.com/{id}.jpg"),
            });
        self.set_stock(id, stock);
        self
    }

    pub fn set_stock(&self, id: ProductId, amount: u32) {
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, amount);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Hold every stock response until `parties` stock calls are waiting.
    pub fn hold_stock(&self, parties: usize) {
        *self.stock_gate.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::new(Barrier::new(parties)));
    }

    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), CatalogError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl Catalog for FakeCatalog {
    async fn products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        self.check_online()?;
        Ok(self
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
        self.check_online()?;
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("products/{id}")))
    }

    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .stock_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        self.check_online()?;
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|&amount| Stock { id, amount })
            .ok_or_else(|| CatalogError::NotFound(format!("stock/{id}")))
    }
}
