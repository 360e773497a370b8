//! Integration tests for the Mosslad storefront.
//!
//! The storefront router is driven in-process: requests go straight into the
//! axum `Router` through `tower::ServiceExt::oneshot`, so no socket is bound
//! and each test owns its own session.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mosslad-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::new(MemoryStorage::new());
//! let resp = ctx.post("/cart/add", &[("product_id", "3")]).await;
//! assert_eq!(resp.location.as_deref(), Some("/"));
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use mosslad_storefront::catalog::Catalog;
use mosslad_storefront::routes;
use mosslad_storefront::state::AppState;
use mosslad_storefront::storage::Storage;

/// Products in the catalog every test context starts with.
pub const TEST_CATALOG_SIZE: u16 = 12;

/// Seed for the test catalog.
pub const TEST_CATALOG_SEED: u64 = 7;

/// A storefront router plus the state behind it.
pub struct TestContext {
    pub state: AppState,
    router: Router,
}

/// What a test needs from a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

impl TestContext {
    /// Serve the seeded test catalog with `storage` holding the cart.
    pub fn new(storage: impl Storage + Send + 'static) -> Self {
        Self::with_catalog(
            Catalog::seeded(TEST_CATALOG_SIZE, TEST_CATALOG_SEED),
            storage,
        )
    }

    /// Serve `catalog` with `storage` holding the cart.
    pub fn with_catalog(catalog: Catalog, storage: impl Storage + Send + 'static) -> Self {
        let state = AppState::new(Arc::new(catalog), storage);
        let router = routes::routes().with_state(state.clone());
        Self { state, router }
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, String::new()).await
    }

    /// Send a form POST.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, path, form_body(form)).await
    }

    /// Send a request with an arbitrary method.
    pub async fn send(&self, method: Method, path: &str, body: String) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// The cart as served by `/api/cart`.
    pub async fn cart(&self) -> serde_json::Value {
        self.get("/api/cart").await.json()
    }

    /// The location the session currently mirrors.
    #[must_use]
    pub fn location(&self) -> String {
        self.state.session().unwrap().page().path
    }
}

/// Encode `form` as an `application/x-www-form-urlencoded` body.
#[must_use]
pub fn form_body(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body() {
        assert_eq!(form_body(&[]), "");
        assert_eq!(
            form_body(&[("to", "/"), ("section", "about")]),
            "to=%2F&section=about"
        );
        assert_eq!(form_body(&[("to", "/a\nb")]), "to=%2Fa%0Ab");
        assert_eq!(
            form_body(&[("email", "ana@example.com"), ("message", "a b&c")]),
            "email=ana%40example.com&message=a%20b%26c"
        );
    }
}
