//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home view
//! GET  /catalog                - Full catalog view
//! GET  /*                      - Not found view (404); the path is still mirrored
//! GET  /favicon.ico            - 204, never a location change
//!
//! # Navigation
//! POST /navigate               - Push a location (optional #section), 303 to it
//!
//! # Cart (303 back to the current location)
//! POST /cart/add               - Add one unit, opens the drawer
//! POST /cart/update            - Set quantity (zero or unparsable removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! POST /cart/checkout          - Checkout placeholder
//!
//! # Cart drawer
//! POST /drawer/toggle          - Open or close the drawer
//! POST /drawer/close           - Close the drawer
//!
//! # Contact
//! POST /contact                - Demo acknowledgement
//!
//! # API
//! GET  /api/cart               - Cart lines, item count and subtotal as JSON
//! ```

pub mod cart;
pub mod contact;
pub mod navigation;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the cart drawer routes router.
pub fn drawer_routes() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(cart::toggle_drawer))
        .route("/close", post(cart::close_drawer))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Views
        .route("/", get(pages::show))
        .route("/catalog", get(pages::show))
        .route("/favicon.ico", get(pages::favicon))
        // Navigation
        .route("/navigate", post(navigation::navigate))
        // Cart routes
        .nest("/cart", cart_routes())
        .nest("/drawer", drawer_routes())
        // Contact
        .route("/contact", post(contact::submit))
        // JSON API
        .route("/api/cart", get(cart::summary))
        // Everything else is the not-found view
        .fallback(pages::fallback)
}
