//! Favorites: locally kept snapshots of global notes.
//!
//! A favorite is a full copy of a [`GlobalNote`] taken when it was favorited.
//! It is never refreshed from the remote source, so it can go stale. The
//! collection lives under [`FAVORITES_KEY`] and every change rewrites it
//! whole.

use log::debug;

use crate::models::GlobalNote;
use crate::storage::{FAVORITES_KEY, KeyValueStore, StorageError};

/// Favorites mirror over a key-value store.
///
/// Holds no cached state: each call reads the stored collection afresh.
pub struct Favorites<S> {
    store: S,
}

impl<S: KeyValueStore> Favorites<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All favorites in the order they were added.
    pub fn list(&self) -> Result<Vec<GlobalNote>, StorageError> {
        self.store.load(FAVORITES_KEY)
    }

    /// True if a snapshot with this `_id` is stored.
    pub fn contains(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.list()?.iter().any(|note| note.id == id))
    }

    /// Stores `snapshot` unless a favorite with the same `_id` exists.
    ///
    /// Returns whether the collection changed.
    pub fn add(&self, snapshot: GlobalNote) -> Result<bool, StorageError> {
        let mut favorites = self.list()?;
        if favorites.iter().any(|note| note.id == snapshot.id) {
            return Ok(false);
        }

        debug!("adding favorite {}", snapshot.id);
        favorites.push(snapshot);
        self.store.save(FAVORITES_KEY, &favorites)?;
        Ok(true)
    }

    /// Removes the favorite with this `_id`, if present.
    ///
    /// Returns whether the collection changed.
    pub fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut favorites = self.list()?;
        let before = favorites.len();
        favorites.retain(|note| note.id != id);
        if favorites.len() == before {
            return Ok(false);
        }

        debug!("removing favorite {id}");
        self.store.save(FAVORITES_KEY, &favorites)?;
        Ok(true)
    }
}
