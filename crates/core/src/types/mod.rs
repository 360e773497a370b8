//! Core types for the Mosslad storefront.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::CartLine;
pub use id::*;
pub use price::{Price, PriceError, format_money};
pub use product::Product;
