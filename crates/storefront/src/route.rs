//! Route store.
//!
//! [`RouteStore`] holds the current path and keeps it in lock-step with the
//! navigation collaborator. Paths change in exactly two ways:
//! - [`RouteStore::navigate`], which pushes a history entry when the target
//!   differs from the current location
//! - a back/forward notification from the collaborator, applied by
//!   [`RouteStore::sync`]
//!
//! # Views
//!
//! Only `/` and `/catalog` are routes. The "About" and "Contact" sections are
//! anchors inside the home view (see [`Section`]); any other path renders the
//! not-found view while the store still mirrors it.

use tokio::sync::watch;

use crate::navigation::{Navigation, PositionChanges};

/// The view a path renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Catalog,
    NotFound,
}

impl View {
    /// Resolve a path. A single trailing slash is ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = match path.strip_suffix('/') {
            Some("") | None => path,
            Some(rest) => rest,
        };
        match trimmed {
            "/" => Self::Home,
            "/catalog" => Self::Catalog,
            _ => Self::NotFound,
        }
    }

    /// The canonical path of a routable view.
    #[must_use]
    pub const fn path(self) -> Option<&'static str> {
        match self {
            Self::Home => Some("/"),
            Self::Catalog => Some("/catalog"),
            Self::NotFound => None,
        }
    }
}

/// In-page anchors of the home view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Catalog,
    About,
    Contact,
}

impl Section {
    /// The fragment id, without `#`.
    #[must_use]
    pub const fn anchor(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::About => "about",
            Self::Contact => "contact",
        }
    }

    /// Parse a fragment id, with or without a leading `#`.
    #[must_use]
    pub fn from_anchor(anchor: &str) -> Option<Self> {
        match anchor.trim_start_matches('#') {
            "catalog" => Some(Self::Catalog),
            "about" => Some(Self::About),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }
}

/// Side effects requested by a route transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEvent {
    /// A new history entry was pushed; the view should start at the top.
    ScrollToTop,
}

/// Owner of the current route.
#[derive(Debug)]
pub struct RouteStore<N> {
    navigation: N,
    positions: PositionChanges,
    path: String,
    changes: watch::Sender<String>,
}

impl<N: Navigation> RouteStore<N> {
    /// Start at the collaborator's current location.
    pub fn initialize(navigation: N) -> Self {
        let positions = navigation.subscribe();
        let path = navigation.current_path();
        let (changes, _) = watch::channel(path.clone());
        Self {
            navigation,
            positions,
            path,
            changes,
        }
    }

    /// The current path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The view for the current path.
    #[must_use]
    pub fn view(&self) -> View {
        View::from_path(&self.path)
    }

    /// Receive the path each time it changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.changes.subscribe()
    }

    /// Go to `to`.
    ///
    /// If `to` is already the current location only the store state is set;
    /// otherwise a history entry is pushed and [`RouteEvent::ScrollToTop`] is
    /// returned.
    pub fn navigate(&mut self, to: &str) -> Option<RouteEvent> {
        self.sync();

        if to == self.navigation.current_path() {
            self.set_path(to);
            return None;
        }

        self.navigation.push(to);
        self.set_path(to);
        tracing::debug!(path = to, "navigated");
        Some(RouteEvent::ScrollToTop)
    }

    /// Apply a pending back/forward notification.
    ///
    /// Returns `true` if the path changed. Call this before rendering.
    pub fn sync(&mut self) -> bool {
        if !self.positions.has_changed().unwrap_or(false) {
            return false;
        }
        let path = self.positions.borrow_and_update().clone();
        if path == self.path {
            return false;
        }
        tracing::debug!(from = %self.path, to = %path, "location changed");
        self.set_path(&path);
        true
    }

    /// The navigation collaborator.
    #[must_use]
    pub const fn navigation(&self) -> &N {
        &self.navigation
    }

    /// Mutable access to the navigation collaborator.
    ///
    /// Back/forward moves made through it are picked up by the next
    /// [`RouteStore::sync`].
    pub const fn navigation_mut(&mut self) -> &mut N {
        &mut self.navigation
    }

    fn set_path(&mut self, path: &str) {
        if self.path != path {
            self.path = path.to_string();
            self.changes.send_replace(self.path.clone());
        }
    }
}
