//! Station records and the station registry.
//!
//! Each station lives in its own record keyed by id, so stations can be
//! added, renamed, and removed without touching unrelated ones. The
//! registry list at [`crate::keys::registry_key`] holds the ordered set of
//! known ids. Record mutations go through compare-and-swap with bounded
//! retry: the store has no cross-call transactions, and CAS turns a lost
//! update into a visible, retryable conflict.

mod ops;
mod types;

use std::sync::Arc;

use lobby_core::ListStore;

pub use types::Station;
pub use types::StationStatus;

/// Manager for station records and the registry of known ids.
pub struct StationRegistry<S: ListStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ListStore + ?Sized + 'static> StationRegistry<S> {
    /// Create a new station registry over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}
