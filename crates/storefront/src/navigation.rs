//! Navigable history abstraction.
//!
//! The route store only needs three things from its host: the current path, a
//! way to push a new entry, and a notification when the position changes
//! without a push (back/forward). [`Navigation`] captures exactly that.
//!
//! - [`MemoryHistory`] is a full in-memory history stack with `back` and
//!   `forward`, used by tests and embedders without a browser.
//! - [`LocationMirror`] tracks the location of a browser talking to the HTTP
//!   host: pushes become redirects, and a request for a different path is the
//!   browser reporting a back/forward move.

use tokio::sync::watch;

/// Receives the new current path each time the position changes externally.
pub type PositionChanges = watch::Receiver<String>;

/// Host history contract consumed by the route store.
pub trait Navigation {
    /// The path of the current history entry.
    fn current_path(&self) -> String;

    /// Push a new entry for `path` and make it current.
    ///
    /// Pushing does not fire a position-changed notification.
    fn push(&mut self, path: &str);

    /// Subscribe to back/forward position changes.
    fn subscribe(&self) -> PositionChanges;
}

// =============================================================================
// In-memory history
// =============================================================================

/// A history stack held in memory.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
    position: watch::Sender<String>,
}

impl MemoryHistory {
    /// A history with a single entry for `initial`.
    #[must_use]
    pub fn new(initial: &str) -> Self {
        let (position, _) = watch::channel(initial.to_string());
        Self {
            entries: vec![initial.to_string()],
            index: 0,
            position,
        }
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history has at least its initial entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Move one entry back. Returns `false` at the oldest entry.
    pub fn back(&mut self) -> bool {
        self.go(-1)
    }

    /// Move one entry forward. Returns `false` at the newest entry.
    pub fn forward(&mut self) -> bool {
        self.go(1)
    }

    /// Move `delta` entries and notify subscribers.
    ///
    /// Returns `false` (and does nothing) if the target is out of range.
    pub fn go(&mut self, delta: isize) -> bool {
        let Some(target) = self
            .index
            .checked_add_signed(delta)
            .filter(|&target| target < self.entries.len())
        else {
            return false;
        };
        if delta == 0 {
            return true;
        }

        self.index = target;
        self.position.send_replace(self.current_path());
        true
    }
}

impl Navigation for MemoryHistory {
    fn current_path(&self) -> String {
        self.entries
            .get(self.index)
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&mut self, path: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_string());
        self.index = self.entries.len() - 1;
    }

    fn subscribe(&self) -> PositionChanges {
        self.position.subscribe()
    }
}

// =============================================================================
// Browser location mirror
// =============================================================================

/// Server-side mirror of a browser's current location.
///
/// The browser owns the real history. `push` records where the host is about
/// to redirect the browser; [`LocationMirror::arrive`] is called when a page
/// request shows the browser somewhere else, which can only happen through
/// back/forward or a typed URL.
#[derive(Debug)]
pub struct LocationMirror {
    current: String,
    position: watch::Sender<String>,
}

impl LocationMirror {
    /// Start at `initial`.
    #[must_use]
    pub fn new(initial: &str) -> Self {
        let (position, _) = watch::channel(initial.to_string());
        Self {
            current: initial.to_string(),
            position,
        }
    }

    /// Record that the browser is now showing `path`.
    ///
    /// Returns `true` (and notifies subscribers) if this differs from the
    /// mirrored location.
    pub fn arrive(&mut self, path: &str) -> bool {
        if self.current == path {
            return false;
        }
        self.current = path.to_string();
        self.position.send_replace(self.current.clone());
        true
    }
}

impl Navigation for LocationMirror {
    fn current_path(&self) -> String {
        self.current.clone()
    }

    fn push(&mut self, path: &str) {
        self.current = path.to_string();
    }

    fn subscribe(&self) -> PositionChanges {
        self.position.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_does_not_notify() {
        let mut history = MemoryHistory::new("/");
        let rx = history.subscribe();
        history.push("/catalog");
        assert_eq!(history.current_path(), "/catalog");
        assert_eq!(history.len(), 2);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_back_and_forward_notify() {
        let mut history = MemoryHistory::new("/");
        let mut rx = history.subscribe();
        history.push("/catalog");

        assert!(history.back());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "/");

        assert!(history.forward());
        assert_eq!(*rx.borrow_and_update(), "/catalog");
        assert!(!history.forward());
    }

    #[test]
    fn test_back_at_start_is_refused() {
        let mut history = MemoryHistory::new("/");
        let rx = history.subscribe();
        assert!(!history.back());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_push_after_back_drops_forward_entries() {
        let mut history = MemoryHistory::new("/");
        history.push("/catalog");
        history.push("/about");
        history.back();
        history.back();
        history.push("/catalog");
        assert_eq!(history.entries(), ["/", "/catalog"]);
        assert!(!history.forward());
    }

    #[test]
    fn test_location_mirror_arrive() {
        let mut mirror = LocationMirror::new("/");
        let mut rx = mirror.subscribe();

        assert!(!mirror.arrive("/"));
        assert!(!rx.has_changed().unwrap());

        mirror.push("/catalog");
        assert!(!rx.has_changed().unwrap());
        assert!(!mirror.arrive("/catalog"));

        assert!(mirror.arrive("/"));
        assert_eq!(*rx.borrow_and_update(), "/");
        assert_eq!(mirror.current_path(), "/");
    }
}
