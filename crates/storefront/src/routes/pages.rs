//! Page rendering.
//!
//! Every GET for a page lands in [`show`]. The request path is reported to the
//! session first: when it differs from the location the session last pushed,
//! the browser went back, forward, or the shopper typed a URL, and the route
//! store follows before the view is chosen.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use mosslad_core::{Product, ProductId};
use tracing::instrument;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::filters;
use crate::route::View;
use crate::routes::cart::CartView;
use crate::session::PageState;
use crate::state::AppState;

/// Products in the "Popular Sweets" row of the home view.
pub const POPULAR_COUNT: usize = 6;

/// Products in the "Featured Products" preview of the home view.
pub const FEATURED_COUNT: usize = 4;

// =============================================================================
// Views
// =============================================================================

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price.display(),
            image_url: product.image.clone(),
        }
    }
}

fn cards(products: &[Product]) -> Vec<ProductCardView> {
    products.iter().map(ProductCardView::from).collect()
}

/// Header, cart drawer and footer data shared by every page.
#[derive(Clone)]
pub struct Layout {
    pub cart: CartView,
    pub drawer_open: bool,
    pub path: String,
    pub home_active: bool,
    pub catalog_active: bool,
    /// One-off message shown above the content.
    pub notice: Option<String>,
}

impl Layout {
    #[must_use]
    pub fn new(page: &PageState, notice: Option<String>) -> Self {
        Self {
            cart: CartView::from(page),
            drawer_open: page.drawer_open,
            path: page.path.clone(),
            home_active: page.view == View::Home,
            catalog_active: page.view == View::Catalog,
            notice,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    /// "Popular Sweets" row.
    pub popular: Vec<ProductCardView>,
    /// "Featured Products" preview.
    pub featured: Vec<ProductCardView>,
}

/// Full catalog template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCardView>,
}

/// Not found template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Render the view `page` selects.
///
/// Unknown paths answer `404 Not Found` with the not-found view. Pages are sent
/// with `Cache-Control: no-store` so back/forward asks the server again.
pub fn render_page(catalog: &Catalog, page: &PageState, notice: Option<String>) -> Response {
    let layout = Layout::new(page, notice);
    let no_store = [(header::CACHE_CONTROL, "no-store")];
    match page.view {
        View::Home => (
            no_store,
            HomeTemplate {
                layout,
                popular: cards(catalog.preview(POPULAR_COUNT)),
                featured: cards(catalog.preview(FEATURED_COUNT)),
            },
        )
            .into_response(),
        View::Catalog => (
            no_store,
            CatalogTemplate {
                layout,
                products: cards(catalog.products()),
            },
        )
            .into_response(),
        View::NotFound => {
            (StatusCode::NOT_FOUND, no_store, NotFoundTemplate { layout }).into_response()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the page at the requested path.
///
/// # Errors
///
/// Returns 500 if the session is unavailable.
#[instrument(skip(state), fields(path = %uri.path()))]
pub async fn show(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    let page = {
        let mut session = state.session()?;
        if session.observe_location(uri.path()) {
            tracing::debug!("location changed outside the app");
        }
        session.page()
    };
    Ok(render_page(state.catalog(), &page, None))
}

/// Any path without its own route.
///
/// GET and HEAD render the not-found view through [`show`]; everything else
/// is `405 Method Not Allowed`.
///
/// # Errors
///
/// Returns 500 if the session is unavailable.
pub async fn fallback(method: Method, state: State<AppState>, uri: Uri) -> Result<Response> {
    if method == Method::GET || method == Method::HEAD {
        show(state, uri).await
    } else {
        Ok(StatusCode::METHOD_NOT_ALLOWED.into_response())
    }
}

/// Browsers ask for `/favicon.ico` on their own; it must not count as a
/// location change.
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
