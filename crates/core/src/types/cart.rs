//! Cart line items.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// One line of a shopping cart.
///
/// `name` and `price` are copied from the product when the line is created and
/// are not refreshed afterwards. `qty` is never zero: a line whose quantity
/// would drop to zero is removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub id: ProductId,
    /// Product name at the time the line was added.
    pub name: String,
    /// Unit price at the time the line was added.
    pub price: Price,
    /// Number of units.
    pub qty: NonZeroU32,
}

impl CartLine {
    /// A new single-unit line for `product`.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            qty: NonZeroU32::MIN,
        }
    }

    /// The same line with one more unit.
    #[must_use]
    pub fn incremented(&self) -> Self {
        Self {
            qty: self.qty.saturating_add(1),
            ..self.clone()
        }
    }

    /// `price * qty`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty.get())
    }
}
