//! Integration tests for the storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_client` - REST client against a live HTTP catalog
//! - `cart_flow` - Controller + catalog client + file store end to end
//!
//! [`CatalogServer`] is an in-process catalog service bound to an ephemeral
//! port. It serves the same endpoints as the real one and can be told to
//! fail, so no external service is needed.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cart_storefront::CatalogClient;
use cart_storefront::config::CatalogConfig;
use serde_json::{Value, json};

/// How the fake service should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Respond with this status and a short text body.
    Status(u16),
    /// Respond 429 with this `Retry-After`.
    RateLimited(u64),
    /// Respond 200 with a body that is not JSON.
    Malformed,
}

#[derive(Default)]
struct ServerState {
    products: Mutex<Vec<Value>>,
    stock: Mutex<HashMap<i32, u32>>,
    hits: Mutex<HashMap<String, usize>>,
    failure: Mutex<Option<Failure>>,
    last_authorization: Mutex<Option<String>>,
}

impl ServerState {
    /// Record the request; return a canned failure response if one is set.
    fn intercept(&self, path: String, headers: &HeaderMap) -> Option<Response> {
        *lock(&self.hits).entry(path).or_insert(0) += 1;
        *lock(&self.last_authorization) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let failure = *lock(&self.failure);
        failure.map(|failure| match failure {
            Failure::Status(code) => (
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "catalog exploded",
            )
                .into_response(),
            Failure::RateLimited(seconds) => {
                let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
                response
                    .headers_mut()
                    .insert("Retry-After", HeaderValue::from(seconds));
                response
            }
            Failure::Malformed => "<html>oops</html>".into_response(),
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Shared = Arc<ServerState>;

async fn list_products(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Some(response) = state.intercept("products".to_string(), &headers) {
        return response;
    }
    Json(lock(&state.products).clone()).into_response()
}

async fn get_product(
    State(state): State<Shared>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    if let Some(response) = state.intercept(format!("products/{id}"), &headers) {
        return response;
    }
    let product = lock(&state.products)
        .iter()
        .find(|p| p["id"] == id)
        .cloned();
    product.map_or_else(
        || (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
        |p| Json(p).into_response(),
    )
}

async fn get_stock(
    State(state): State<Shared>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    if let Some(response) = state.intercept(format!("stock/{id}"), &headers) {
        return response;
    }
    let amount = lock(&state.stock).get(&id).copied();
    amount.map_or_else(
        || (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
        |amount| Json(json!({ "id": id, "amount": amount })).into_response(),
    )
}

/// A running fake catalog service.
pub struct CatalogServer {
    base_url: String,
    state: Shared,
}

impl CatalogServer {
    /// Bind to an ephemeral port and start serving in the background.
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/stock/{id}", get(get_stock))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind catalog server");
        let addr = listener.local_addr().expect("catalog server address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("catalog server");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL the server is reachable at.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List a product. `price` is written as a JSON number, as the real service does.
    #[must_use]
    pub fn with_product(self, id: i32, title: &str, price: f64, stock: u32) -> Self {
        lock(&self.state.products).push(json!({
            "id": id,
            "title": title,
            "price": price,
            "image": format!("https://cdn.example.com/{id}.jpg"),
        }));
        self.set_stock(id, stock);
        self
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        lock(&self.state.stock).insert(id, amount);
    }

    pub fn fail_with(&self, failure: Failure) {
        *lock(&self.state.failure) = Some(failure);
    }

    pub fn recover(&self) {
        *lock(&self.state.failure) = None;
    }

    /// How many requests hit `path` (e.g. `"stock/1"`).
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        lock(&self.state.hits).get(path).copied().unwrap_or(0)
    }

    /// The `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        lock(&self.state.last_authorization).clone()
    }

    /// Catalog configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        let mut config = CatalogConfig::new(&self.base_url).expect("valid base URL");
        config.cache_ttl = Duration::from_secs(60);
        config
    }

    /// A client for this server with default settings.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&self.config()).expect("catalog client")
    }
}
