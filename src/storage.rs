//! Durable key-value persistence for the note, tag and favorites collections.
//!
//! Every collection is stored whole under a fixed key as a JSON document and
//! rewritten whole on save. A key that was never written loads as the
//! collection's default, which is how first use looks.

mod memory;
mod schema;
mod sqlite;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key holding the stored notes.
pub const NOTES_KEY: &str = "NOTES";
/// Key holding the tag registry.
pub const TAGS_KEY: &str = "TAGS";
/// Key holding favorite snapshots.
pub const FAVORITES_KEY: &str = "favorites";

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite back end failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value is not valid JSON for the expected type.
    #[error("Stored value for '{key}' could not be read: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized.
    #[error("Value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The back end refused a write.
    #[error("Write rejected: {0}")]
    Write(String),
}

/// String-keyed store of JSON documents.
///
/// Back ends only implement [`get`](Self::get) and [`put`](Self::put);
/// typed access goes through [`load`](Self::load) and [`save`](Self::save).
pub trait KeyValueStore {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Loads and decodes the value under `key`, or `T::default()` when the
    /// key has never been written.
    fn load<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        match self.get(key)? {
            None => Ok(T::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                warn!("stored value for {key} is not valid: {source}");
                StorageError::Decode {
                    key: key.to_string(),
                    source,
                }
            }),
        }
    }

    /// Encodes `value` and stores it under `key`.
    fn save<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.put(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).put(key, value)
    }
}
