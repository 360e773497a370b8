//! A storefront session: both stores plus the UI-owned drawer flag.
//!
//! Views never touch the stores directly. They read a [`PageState`] and send
//! back an [`Intent`]; [`StorefrontSession::dispatch`] turns the intent into
//! a store operation and reacts to the events the stores emit (an added item
//! opens the cart drawer).

use std::sync::Arc;

use mosslad_core::{Price, ProductId};

use crate::cart::{CartEvent, CartSnapshot, CartStore};
use crate::catalog::Catalog;
use crate::navigation::{LocationMirror, Navigation};
use crate::route::{RouteEvent, RouteStore, View};
use crate::storage::Storage;

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddItem(ProductId),
    RemoveItem(ProductId),
    SetQuantity { id: ProductId, qty: i64 },
    Clear,
    Navigate(String),
    ToggleDrawer,
    CloseDrawer,
}

/// Everything a view needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub view: View,
    pub path: String,
    pub cart: CartSnapshot,
    pub subtotal: Price,
    pub item_count: u64,
    pub drawer_open: bool,
}

/// One shopper's storefront state.
#[derive(Debug)]
pub struct StorefrontSession<S, N> {
    catalog: Arc<Catalog>,
    cart: CartStore<S>,
    route: RouteStore<N>,
    drawer_open: bool,
}

impl<S: Storage, N: Navigation> StorefrontSession<S, N> {
    /// Restore the cart from `storage` and start at `navigation`'s location.
    pub fn new(catalog: Arc<Catalog>, storage: S, navigation: N) -> Self {
        Self {
            catalog,
            cart: CartStore::initialize(storage),
            route: RouteStore::initialize(navigation),
            drawer_open: false,
        }
    }

    /// Apply an intent.
    ///
    /// Returns the route side effect to perform, if any.
    pub fn dispatch(&mut self, intent: Intent) -> Option<RouteEvent> {
        tracing::debug!(?intent, "dispatch");
        match intent {
            Intent::AddItem(id) => {
                let Some(product) = self.catalog.get(id) else {
                    tracing::debug!(%id, "ignoring add of unknown product");
                    return None;
                };
                let added = self.cart.add_item(product);
                match added.event {
                    CartEvent::ItemAdded { .. } => self.drawer_open = true,
                }
                None
            }
            Intent::RemoveItem(id) => {
                self.cart.remove_item(id);
                None
            }
            Intent::SetQuantity { id, qty } => {
                self.cart.set_quantity(id, qty);
                None
            }
            Intent::Clear => {
                self.cart.clear();
                None
            }
            Intent::Navigate(to) => self.route.navigate(&to),
            Intent::ToggleDrawer => {
                self.drawer_open = !self.drawer_open;
                None
            }
            Intent::CloseDrawer => {
                self.drawer_open = false;
                None
            }
        }
    }

    /// Current state for rendering, after applying any pending location change.
    pub fn page(&mut self) -> PageState {
        self.route.sync();
        let cart = self.cart.snapshot().clone();
        PageState {
            view: self.route.view(),
            path: self.route.path().to_string(),
            subtotal: cart.subtotal(),
            item_count: cart.item_count(),
            cart,
            drawer_open: self.drawer_open,
        }
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    /// The route store.
    #[must_use]
    pub const fn route(&self) -> &RouteStore<N> {
        &self.route
    }

    /// Mutable access to the route store, for hosts that drive history.
    pub const fn route_mut(&mut self) -> &mut RouteStore<N> {
        &mut self.route
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub const fn drawer_open(&self) -> bool {
        self.drawer_open
    }
}

impl<S: Storage> StorefrontSession<S, LocationMirror> {
    /// Report that the browser is showing `path`.
    ///
    /// Returns `true` if that was a location change (back/forward or a typed
    /// URL) and the route store now reflects it.
    pub fn observe_location(&mut self, path: &str) -> bool {
        self.route.navigation_mut().arrive(path) && self.route.sync()
    }
}
