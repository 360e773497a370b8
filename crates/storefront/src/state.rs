//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::navigation::LocationMirror;
use crate::session::StorefrontSession;
use crate::storage::{FileStorage, Storage};

/// Cart storage as held by the host.
pub type HostStorage = Box<dyn Storage + Send>;

/// The single storefront session served by this process.
pub type HostSession = StorefrontSession<HostStorage, LocationMirror>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The session sits behind one
/// mutex: a handler holds the guard from dispatching an intent until the
/// resulting state is persisted and read back, so concurrent requests are
/// applied one at a time and each sees the previous result.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Arc<Catalog>,
    session: Mutex<HostSession>,
}

impl AppState {
    /// Create application state around an existing catalog and storage.
    pub fn new(catalog: Arc<Catalog>, storage: impl Storage + Send + 'static) -> Self {
        let storage: HostStorage = Box::new(storage);
        let session = StorefrontSession::new(Arc::clone(&catalog), storage, LocationMirror::new("/"));

        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                session: Mutex::new(session),
            }),
        }
    }

    /// Generate the catalog and open file storage as configured.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        let catalog = match config.catalog.seed {
            Some(seed) => Catalog::seeded(config.catalog.size, seed),
            None => Catalog::random(config.catalog.size),
        };
        tracing::info!(products = catalog.len(), "catalog generated");

        Self::new(Arc::new(catalog), FileStorage::new(&config.data_dir))
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Lock the storefront session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionPoisoned` if a previous holder panicked.
    pub fn session(&self) -> Result<MutexGuard<'_, HostSession>, AppError> {
        self.inner
            .session
            .lock()
            .map_err(|_| AppError::SessionPoisoned)
    }
}
