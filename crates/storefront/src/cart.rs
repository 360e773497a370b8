//! Cart store.
//!
//! [`CartStore`] owns the authoritative list of cart lines. Every mutation
//! computes the next snapshot, writes it to the storage collaborator, and
//! publishes it to subscribers before returning, so callers never observe a
//! state that has not been handed to storage.
//!
//! # Ordering
//!
//! A product added for the first time goes to the front of the cart. Adding a
//! product that already has a line bumps that line's quantity where it is.
//!
//! # Failure policy
//!
//! Nothing here returns an error. A missing or corrupt persisted cart loads as
//! an empty cart, and a failed write is logged and otherwise ignored: the
//! in-memory snapshot stays authoritative.

use std::collections::HashSet;
use std::num::NonZeroU32;

use mosslad_core::{CartLine, Price, Product, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::storage::Storage;

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "mosslad_cart";

/// Why a persisted cart could not be restored.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed cart JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate cart line for product {0}")]
    DuplicateLine(ProductId),
}

/// An immutable view of the cart lines, most recently added product first.
///
/// Serializes as the bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Decode a persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the text is not a JSON array of valid lines,
    /// or if two lines share a product id.
    pub fn decode(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(raw)?;
        let mut seen = HashSet::with_capacity(snapshot.lines.len());
        for line in &snapshot.lines {
            if !seen.insert(line.id) {
                return Err(SnapshotError::DuplicateLine(line.id));
            }
        }
        Ok(snapshot)
    }

    /// Encode for storage.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The cart lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.qty.get())).sum()
    }

    /// Exact sum of `price * qty` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        subtotal(self)
    }

    fn with_added(&self, product: &Product) -> Self {
        let mut lines = self.lines.clone();
        if let Some(line) = lines.iter_mut().find(|line| line.id == product.id) {
            *line = line.incremented();
        } else {
            lines.insert(0, CartLine::from_product(product));
        }
        Self { lines }
    }

    fn without(&self, id: ProductId) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .filter(|line| line.id != id)
                .cloned()
                .collect(),
        }
    }

    fn with_quantity(&self, id: ProductId, qty: NonZeroU32) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .map(|line| {
                    if line.id == id {
                        CartLine {
                            qty,
                            ..line.clone()
                        }
                    } else {
                        line.clone()
                    }
                })
                .collect(),
        }
    }
}

/// Exact sum of `price * qty` over all lines of `snapshot`.
///
/// No rounding happens here; see [`mosslad_core::format_money`] for display.
#[must_use]
pub fn subtotal(snapshot: &CartSnapshot) -> Price {
    snapshot.lines.iter().map(CartLine::line_total).sum()
}

/// Interpret a requested quantity.
///
/// Anything that is not a positive integer means "remove the line"; values
/// above `u32::MAX` are clamped.
#[must_use]
pub fn positive_quantity(qty: i64) -> Option<NonZeroU32> {
    if qty <= 0 {
        return None;
    }
    NonZeroU32::new(u32::try_from(qty).unwrap_or(u32::MAX))
}

/// Events emitted alongside cart transitions for the UI layer to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    /// A unit of `id` was added; the line now holds `qty` units.
    ///
    /// The storefront opens the cart drawer in response.
    ItemAdded { id: ProductId, qty: NonZeroU32 },
}

/// Result of [`CartStore::add_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub snapshot: CartSnapshot,
    pub event: CartEvent,
}

/// Owner of the cart lines and their persistence.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    snapshot: CartSnapshot,
    changes: watch::Sender<CartSnapshot>,
}

impl<S: Storage> CartStore<S> {
    /// Restore the cart persisted under [`CART_STORAGE_KEY`].
    pub fn initialize(storage: S) -> Self {
        Self::initialize_with_key(storage, CART_STORAGE_KEY)
    }

    /// Restore the cart persisted under `key`.
    ///
    /// A missing key or an undecodable value yields an empty cart.
    pub fn initialize_with_key(storage: S, key: &str) -> Self {
        let snapshot = match storage.get(key) {
            None => CartSnapshot::empty(),
            Some(raw) => CartSnapshot::decode(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "discarding unreadable persisted cart");
                CartSnapshot::empty()
            }),
        };
        tracing::debug!(key, lines = snapshot.len(), "cart restored");

        let (changes, _) = watch::channel(snapshot.clone());
        Self {
            storage,
            key: key.to_string(),
            snapshot,
            changes,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn snapshot(&self) -> &CartSnapshot {
        &self.snapshot
    }

    /// Receive every snapshot committed after this call.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.changes.subscribe()
    }

    /// Add one unit of `product`.
    pub fn add_item(&mut self, product: &Product) -> Added {
        let next = self.snapshot.with_added(product);
        let qty = next
            .line(product.id)
            .map_or(NonZeroU32::MIN, |line| line.qty);
        Added {
            snapshot: self.commit(next),
            event: CartEvent::ItemAdded {
                id: product.id,
                qty,
            },
        }
    }

    /// Drop the line for `id`. Absent ids are a no-op.
    pub fn remove_item(&mut self, id: ProductId) -> CartSnapshot {
        let next = self.snapshot.without(id);
        self.commit(next)
    }

    /// Set the quantity of the line for `id`.
    ///
    /// A quantity of zero or less removes the line. Absent ids are a no-op.
    pub fn set_quantity(&mut self, id: ProductId, qty: i64) -> CartSnapshot {
        let next = match positive_quantity(qty) {
            Some(qty) => self.snapshot.with_quantity(id, qty),
            None => self.snapshot.without(id),
        };
        self.commit(next)
    }

    /// Empty the cart.
    pub fn clear(&mut self) -> CartSnapshot {
        self.commit(CartSnapshot::empty())
    }

    /// Exact subtotal of the current cart.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        subtotal(&self.snapshot)
    }

    /// The storage collaborator.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage collaborator.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn commit(&mut self, next: CartSnapshot) -> CartSnapshot {
        self.snapshot = next;
        self.persist();
        self.changes.send_replace(self.snapshot.clone());
        self.snapshot.clone()
    }

    fn persist(&mut self) {
        let encoded = match self.snapshot.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to encode cart; not persisted");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &encoded) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist cart");
        }
    }
}
