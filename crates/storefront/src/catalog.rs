//! Demo product catalog.
//!
//! The catalog is generated once at startup and shared read-only (behind an
//! `Arc`) for the rest of the process. Ids run `1..=N` in order, so looking a
//! product up again never renumbers or reshuffles anything.

use mosslad_core::{Price, Product, ProductId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of products generated when no size is configured.
pub const DEFAULT_CATALOG_SIZE: u16 = 48;

/// Lowest generated price, in cents.
const MIN_PRICE_CENTS: u32 = 1_000;
/// Highest generated price, in cents.
const MAX_PRICE_CENTS: u32 = 10_000;

/// Image URL shown on a product card.
#[must_use]
pub fn product_image_url(id: ProductId) -> String {
    format!("https://picsum.photos/seed/mosslad{id}/600/400")
}

/// Thumbnail URL shown next to a cart line.
#[must_use]
pub fn cart_thumbnail_url(id: ProductId) -> String {
    format!("https://picsum.photos/seed/cart{id}/120/80")
}

/// An immutable, ordered list of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Generate `count` products, drawing prices from `rng`.
    pub fn generate<R: Rng + ?Sized>(count: u16, rng: &mut R) -> Self {
        let products = (1..=count)
            .map(|n| {
                let id = ProductId::new(i32::from(n));
                Product {
                    id,
                    name: format!("Product {id}"),
                    price: Price::from_cents(rng.random_range(MIN_PRICE_CENTS..=MAX_PRICE_CENTS)),
                    image: product_image_url(id),
                }
            })
            .collect();

        Self { products }
    }

    /// Generate a catalog that is identical for the same `seed`.
    #[must_use]
    pub fn seeded(count: u16, seed: u64) -> Self {
        Self::generate(count, &mut StdRng::seed_from_u64(seed))
    }

    /// Generate a catalog with prices from the thread-local RNG.
    #[must_use]
    pub fn random(count: u16) -> Self {
        Self::generate(count, &mut rand::rng())
    }

    /// Wrap an explicit product list.
    #[must_use]
    pub const fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The first `count` products (fewer if the catalog is smaller).
    #[must_use]
    pub fn preview(&self, count: usize) -> &[Product] {
        self.products
            .get(..count.min(self.products.len()))
            .unwrap_or_default()
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
