//! Mosslad Core - Shared domain types.
//!
//! This crate provides the types the storefront components exchange:
//! - `storefront` - Cart store, route store, catalog and the HTTP host
//! - `integration-tests` - End-to-end tests of the storefront host
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no storage,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, products and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
