//! Mosslad Storefront library.
//!
//! The cart and route stores, the product catalog, and the axum host that
//! serves them. Exposed as a library so the stores can be driven directly in
//! tests and the router can be exercised without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod navigation;
pub mod route;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
