//! Cart route handlers.
//!
//! Every cart button posts a small form here. The handler dispatches the
//! matching intent on the shared session and answers `303 See Other` back to
//! the page the shopper is on, so a reload never replays the intent.

use std::num::IntErrorKind;

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use mosslad_core::{CartLine, Price, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::cart_thumbnail_url;
use crate::error::{Result, add_breadcrumb};
use crate::routes::navigation::{OriginForm, observe_origin};
use crate::routes::pages::render_page;
use crate::session::{Intent, PageState};
use crate::state::AppState;

/// Notice shown instead of a checkout.
pub const CHECKOUT_PLACEHOLDER: &str = "Checkout placeholder";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub thumbnail_url: String,
    /// Quantity the `-` button requests (zero removes the line).
    pub decrement_to: i64,
    /// Quantity the `+` button requests.
    pub increment_to: i64,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::ZERO.display(),
            item_count: 0,
        }
    }

    /// Whether there is nothing to list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&PageState> for CartView {
    fn from(page: &PageState) -> Self {
        Self {
            items: page.cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: page.subtotal.display(),
            item_count: page.item_count,
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let quantity = line.qty.get();
        Self {
            id: line.id,
            name: line.name.clone(),
            quantity,
            price: line.price.display(),
            line_price: line.line_total().display(),
            thumbnail_url: cart_thumbnail_url(line.id),
            decrement_to: i64::from(quantity) - 1,
            increment_to: i64::from(quantity) + 1,
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add/remove form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
    /// Path of the page the form was submitted from.
    #[serde(default)]
    pub from: Option<String>,
}

/// Update quantity form data.
///
/// `quantity` is kept as text: anything that is not an integer removes the
/// line, like a zero would.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: String,
    #[serde(default)]
    pub from: Option<String>,
}

/// Interpret a submitted quantity.
///
/// Integers too large for `i64` saturate to `i64::MAX`; anything else that is
/// not an integer counts as zero.
#[must_use]
pub fn parse_quantity(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(qty) => qty,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
        Err(_) => 0,
    }
}

/// JSON cart summary.
#[derive(Debug, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub item_count: u64,
    pub subtotal: Price,
    pub subtotal_display: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Dispatch `intent` from the page at `from` and redirect back to the
/// current location.
fn dispatch_and_return(
    state: &AppState,
    from: Option<&str>,
    intent: Intent,
) -> Result<Redirect> {
    let mut session = state.session()?;
    observe_origin(&mut session, from);
    session.dispatch(intent);
    let location = session.page().path;
    Ok(Redirect::to(&location))
}

/// Add one unit of a product. Opens the cart drawer.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
    dispatch_and_return(
        &state,
        form.from.as_deref(),
        Intent::AddItem(form.product_id),
    )
}

/// Set a line's quantity.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let qty = parse_quantity(&form.quantity);
    let (product_id, quantity) = (form.product_id.to_string(), qty.to_string());
    add_breadcrumb(
        "cart",
        "Changed quantity",
        Some(&[
            ("product_id", product_id.as_str()),
            ("quantity", quantity.as_str()),
        ]),
    );
    dispatch_and_return(
        &state,
        form.from.as_deref(),
        Intent::SetQuantity {
            id: form.product_id,
            qty,
        },
    )
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Removed item", Some(&[("product_id", product_id.as_str())]));
    dispatch_and_return(
        &state,
        form.from.as_deref(),
        Intent::RemoveItem(form.product_id),
    )
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    Form(form): Form<OriginForm>,
) -> Result<Redirect> {
    add_breadcrumb("cart", "Cleared cart", None);
    dispatch_and_return(&state, form.from.as_deref(), Intent::Clear)
}

/// Open or close the cart drawer.
#[instrument(skip(state))]
pub async fn toggle_drawer(
    State(state): State<AppState>,
    Form(form): Form<OriginForm>,
) -> Result<Redirect> {
    dispatch_and_return(&state, form.from.as_deref(), Intent::ToggleDrawer)
}

/// Close the cart drawer.
#[instrument(skip(state))]
pub async fn close_drawer(
    State(state): State<AppState>,
    Form(form): Form<OriginForm>,
) -> Result<Redirect> {
    dispatch_and_return(&state, form.from.as_deref(), Intent::CloseDrawer)
}

/// Checkout placeholder. There is no real checkout: the current page is
/// rendered again with a notice.
///
/// # Errors
///
/// Returns 500 if the session is unavailable.
#[instrument(skip(state))]
pub async fn checkout(
    State(state): State<AppState>,
    Form(form): Form<OriginForm>,
) -> Result<Response> {
    add_breadcrumb("cart", "Checkout placeholder", None);
    let page = {
        let mut session = state.session()?;
        observe_origin(&mut session, form.from.as_deref());
        session.page()
    };
    Ok(render_page(
        state.catalog(),
        &page,
        Some(CHECKOUT_PLACEHOLDER.to_string()),
    ))
}

/// Current cart as JSON.
#[instrument(skip(state))]
pub async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let page = state.session()?.page();
    Ok(Json(CartSummary {
        lines: page.cart.lines().to_vec(),
        item_count: page.item_count,
        subtotal: page.subtotal,
        subtotal_display: page.subtotal.display(),
    }))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3"), 3);
        assert_eq!(parse_quantity(" 12 "), 12);
        assert_eq!(parse_quantity("-1"), -1);
        assert_eq!(parse_quantity("2.5"), 0);
        assert_eq!(parse_quantity("-inf"), 0);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("99999999999999999999"), i64::MAX);
        assert_eq!(parse_quantity("-99999999999999999999"), 0);
    }

    #[test]
    fn test_cart_item_view_from_line() {
        let line = CartLine {
            id: ProductId::new(4),
            name: "Product 4".to_string(),
            price: Price::from_cents(1050),
            qty: NonZeroU32::MIN.saturating_add(2),
        };
        let view = CartItemView::from(&line);
        assert_eq!(view.quantity, 3);
        assert_eq!(view.price, "$10.50");
        assert_eq!(view.line_price, "$31.50");
        assert_eq!(view.thumbnail_url, "https://picsum.photos/seed/cart4/120/80");
        assert_eq!(view.decrement_to, 2);
        assert_eq!(view.increment_to, 4);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert!(view.is_empty());
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.item_count, 0);
    }
}
