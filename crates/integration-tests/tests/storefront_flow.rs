//! End-to-end tests for the storefront router.
//!
//! These tests drive the HTTP host the way a browser would: page GETs, form
//! POSTs answered with redirects, and the JSON cart summary.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use mosslad_core::ProductId;
use mosslad_integration_tests::{TEST_CATALOG_SIZE, TestContext};
use mosslad_storefront::cart::CART_STORAGE_KEY;
use mosslad_storefront::storage::{FileStorage, MemoryStorage, Storage};

fn product_price(ctx: &TestContext, id: i32) -> mosslad_core::Price {
    ctx.state.catalog().get(ProductId::new(id)).unwrap().price
}

// =============================================================================
// Views
// =============================================================================

#[tokio::test]
async fn test_home_renders_sections() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.get("/").await;

    assert_eq!(resp.status, StatusCode::OK);
    for heading in [
        "Popular Sweets",
        "Featured Products",
        "View More",
        "Our Story",
        "About Us",
        "Contact Us",
        "Your cart is empty.",
    ] {
        assert!(resp.body.contains(heading), "home is missing {heading:?}");
    }
    // Six popular products and a four product preview
    assert_eq!(resp.body.matches("Add to cart").count(), 10);
}

#[tokio::test]
async fn test_catalog_lists_every_product() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.get("/catalog").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Full Catalog"));
    assert!(resp.body.contains("Back Home"));
    assert_eq!(
        resp.body.matches("Add to cart").count(),
        usize::from(TEST_CATALOG_SIZE)
    );
    assert!(resp.body.contains("https://picsum.photos/seed/mosslad12/600/400"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found_but_mirrored() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.get("/nope").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.contains("Page not found"));
    assert_eq!(ctx.location(), "/nope");

    // Intents return to wherever the shopper is
    let resp = ctx.post("/cart/add", &[("product_id", "1")]).await;
    assert_eq!(resp.location.as_deref(), Some("/nope"));
}

#[tokio::test]
async fn test_other_methods_on_unknown_paths() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.send(Method::DELETE, "/nope", String::new()).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(ctx.location(), "/");
}

#[tokio::test]
async fn test_favicon_is_not_a_location_change() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.get("/favicon.ico").await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.location(), "/");
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test]
async fn test_navigate_pushes_and_redirects() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.post("/navigate", &[("to", "/catalog")]).await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/catalog"));
    assert_eq!(ctx.location(), "/catalog");

    // Following the redirect is not a second location change
    let resp = ctx.get("/catalog").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(ctx.location(), "/catalog");
}

#[tokio::test]
async fn test_navigate_to_section() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/navigate", &[("to", "/catalog")]).await;

    let resp = ctx
        .post("/navigate", &[("to", "/"), ("section", "about")])
        .await;
    assert_eq!(resp.location.as_deref(), Some("/#about"));
    assert_eq!(ctx.location(), "/");

    let resp = ctx.post("/navigate", &[("to", "/#contact")]).await;
    assert_eq!(resp.location.as_deref(), Some("/#contact"));
}

#[tokio::test]
async fn test_navigate_rejects_foreign_targets() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx
        .post("/navigate", &[("to", "https://example.com/")])
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.location(), "/");
}

#[tokio::test]
async fn test_back_button_is_observed() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/navigate", &[("to", "/catalog")]).await;

    // The browser goes back and reloads "/"
    let resp = ctx.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Popular Sweets"));
    assert_eq!(ctx.location(), "/");

    let resp = ctx.post("/drawer/toggle", &[]).await;
    assert_eq!(resp.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_navigate_rejects_targets_that_are_not_locations() {
    let ctx = TestContext::new(MemoryStorage::new());
    for to in ["/a\nb", "/catalog\r\nSet-Cookie: x=1", "/\u{0}"] {
        let resp = ctx.post("/navigate", &[("to", to)]).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{to:?}");
        assert_eq!(ctx.location(), "/");
    }

    // Later intents still redirect to the last good location
    let resp = ctx.post("/cart/add", &[("product_id", "2")]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/"));
    assert_eq!(ctx.cart().await["item_count"], 1);
}

#[tokio::test]
async fn test_intent_from_restored_page_returns_there() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.get("/").await;
    ctx.post("/navigate", &[("to", "/catalog")]).await;
    ctx.get("/catalog").await;
    assert_eq!(ctx.location(), "/catalog");

    // Back restores "/" from the browser cache, no GET reaches the server
    let resp = ctx
        .post("/cart/add", &[("product_id", "1"), ("from", "/")])
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/"));
    assert_eq!(ctx.location(), "/");
    assert_eq!(ctx.cart().await["item_count"], 1);

    let resp = ctx.post("/drawer/close", &[("from", "/catalog")]).await;
    assert_eq!(resp.location.as_deref(), Some("/catalog"));
}

#[tokio::test]
async fn test_unusable_origin_is_ignored() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/navigate", &[("to", "/catalog")]).await;

    let resp = ctx
        .post("/drawer/toggle", &[("from", "https://example.com/")])
        .await;
    assert_eq!(resp.location.as_deref(), Some("/catalog"));

    let resp = ctx.post("/drawer/toggle", &[("from", "/a\nb")]).await;
    assert_eq!(resp.location.as_deref(), Some("/catalog"));
}

#[tokio::test]
async fn test_every_form_reports_its_origin() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/cart/add", &[("product_id", "1")]).await;

    for path in ["/", "/catalog", "/nope"] {
        let body = ctx.get(path).await.body;
        let origin = format!(r#"<input type="hidden" name="from" value="{path}">"#);
        assert_eq!(
            body.matches("<form").count(),
            body.matches(origin.as_str()).count(),
            "{path} has a form without its origin"
        );
    }
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_add_item_opens_drawer() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.post("/cart/add", &[("product_id", "3")]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let page = ctx.get("/").await;
    assert!(page.body.contains("cart-drawer open"));
    assert!(page.body.contains("https://picsum.photos/seed/cart3/120/80"));

    let cart = ctx.cart().await;
    assert_eq!(cart["item_count"], 1);
    assert_eq!(cart["lines"][0]["id"], 3);
    assert_eq!(cart["lines"][0]["name"], "Product 3");
    assert_eq!(cart["lines"][0]["qty"], 1);
    assert_eq!(cart["subtotal_display"], product_price(&ctx, 3).display());
}

#[tokio::test]
async fn test_add_merges_and_prepends() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/cart/add", &[("product_id", "1")]).await;
    ctx.post("/cart/add", &[("product_id", "2")]).await;
    ctx.post("/cart/add", &[("product_id", "1")]).await;

    let cart = ctx.cart().await;
    assert_eq!(cart["item_count"], 3);
    assert_eq!(cart["lines"][0]["id"], 2);
    assert_eq!(cart["lines"][1]["id"], 1);
    assert_eq!(cart["lines"][1]["qty"], 2);

    let expected = product_price(&ctx, 1).times(2) + product_price(&ctx, 2);
    assert_eq!(cart["subtotal_display"], expected.display());
}

#[tokio::test]
async fn test_add_unknown_product_is_noop() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.post("/cart/add", &[("product_id", "999")]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(ctx.cart().await["item_count"], 0);
}

#[tokio::test]
async fn test_update_quantity() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/cart/add", &[("product_id", "4")]).await;
    ctx.post("/cart/add", &[("product_id", "5")]).await;

    ctx.post("/cart/update", &[("product_id", "4"), ("quantity", "6")])
        .await;
    assert_eq!(ctx.cart().await["item_count"], 7);

    ctx.post("/cart/update", &[("product_id", "4"), ("quantity", "0")])
        .await;
    let cart = ctx.cart().await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);

    ctx.post("/cart/update", &[("product_id", "5"), ("quantity", "lots")])
        .await;
    assert_eq!(ctx.cart().await["item_count"], 0);
}

#[tokio::test]
async fn test_oversized_quantity_is_clamped() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/cart/add", &[("product_id", "4")]).await;

    ctx.post(
        "/cart/update",
        &[("product_id", "4"), ("quantity", "99999999999999999999")],
    )
    .await;
    let cart = ctx.cart().await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["lines"][0]["qty"], u64::from(u32::MAX));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/cart/add", &[("product_id", "1")]).await;
    ctx.post("/cart/add", &[("product_id", "2")]).await;

    ctx.post("/cart/remove", &[("product_id", "1")]).await;
    let cart = ctx.cart().await;
    assert_eq!(cart["lines"][0]["id"], 2);
    assert_eq!(cart["item_count"], 1);

    ctx.post("/cart/clear", &[]).await;
    let cart = ctx.cart().await;
    assert_eq!(cart["item_count"], 0);
    assert_eq!(cart["subtotal_display"], "$0.00");
}

#[tokio::test]
async fn test_drawer_toggle_and_close() {
    let ctx = TestContext::new(MemoryStorage::new());
    ctx.post("/drawer/toggle", &[]).await;
    assert!(ctx.get("/").await.body.contains("cart-drawer open"));

    ctx.post("/drawer/close", &[]).await;
    assert!(!ctx.get("/").await.body.contains("cart-drawer open"));
}

#[tokio::test]
async fn test_checkout_placeholder() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx.post("/cart/checkout", &[]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Checkout placeholder"));
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = TestContext::new(FileStorage::new(dir.path()));
    first.post("/cart/add", &[("product_id", "7")]).await;
    first.post("/cart/add", &[("product_id", "7")]).await;
    let before = first.cart().await;
    drop(first);

    let second = TestContext::new(FileStorage::new(dir.path()));
    assert_eq!(second.cart().await, before);
    assert_eq!(before["lines"][0]["qty"], 2);
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let storage = MemoryStorage::new().with_entry(CART_STORAGE_KEY, "{not json");
    let ctx = TestContext::new(storage);
    assert_eq!(ctx.cart().await["item_count"], 0);

    let resp = ctx.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_legacy_numeric_prices_load() {
    let storage = MemoryStorage::new().with_entry(
        CART_STORAGE_KEY,
        r#"[{"id":2,"name":"Product 2","price":12.5,"qty":3}]"#,
    );
    let ctx = TestContext::new(storage);
    let cart = ctx.cart().await;
    assert_eq!(cart["item_count"], 3);
    assert_eq!(cart["subtotal_display"], "$37.50");
}

#[tokio::test]
async fn test_storage_failure_keeps_cart_in_memory() {
    let ctx = TestContext::new(MemoryStorage::with_quota(8));
    let resp = ctx.post("/cart/add", &[("product_id", "1")]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(ctx.cart().await["item_count"], 1);

    let session = ctx.state.session().unwrap();
    assert!(session.cart().storage().get(CART_STORAGE_KEY).is_none());
}

// =============================================================================
// Contact
// =============================================================================

#[tokio::test]
async fn test_contact_form_acknowledges() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx
        .post(
            "/contact",
            &[
                ("name", "Ana"),
                ("email", "ana@example.com"),
                ("message", "Do you ship?"),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Thanks, message received (demo)"));
}

#[tokio::test]
async fn test_contact_form_rejects_bad_email() {
    let ctx = TestContext::new(MemoryStorage::new());
    let resp = ctx
        .post(
            "/contact",
            &[("name", "Ana"), ("email", "ana"), ("message", "Hi")],
        )
        .await;
    assert!(resp.body.contains("Please enter a valid email address."));
}
