//! Typed persistence gateway over a [`StorageBackend`].
//!
//! # Responsibility
//!
//! Owns the JSON (de)serialization of whole entity collections and the
//! failure policy around it. Domain stores never talk to a backend directly.
//!
//! # Invariants
//!
//! - A missing or unreadable collection never fails a load; it degrades to
//!   `None` (the store falls back to empty) and the cause is logged.
//! - Writes happen after the in-memory state has already been updated. A
//!   failed [`Gateway::persist`] is logged and never rolled back; memory
//!   stays the source of truth for the session.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::storage::StorageBackend;
use crate::Result;

/// Serialization boundary between domain stores and the storage backend.
pub struct Gateway {
    backend: Arc<dyn StorageBackend>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Loads and parses the collection stored under `collection`.
    ///
    /// Returns `None` when the collection has never been written, when the
    /// backend fails to read it, or when the stored payload does not parse.
    /// The last two cases are logged; callers treat all three as "start
    /// empty".
    pub fn load<T: DeserializeOwned>(&self, collection: &str) -> Option<T> {
        match self.backend.read(collection) {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Discarding unparseable collection '{collection}': {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read collection '{collection}': {e}");
                None
            }
        }
    }

    /// Serializes `value` and writes it under `collection`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save<T: Serialize>(&self, collection: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        self.backend.write(collection, &payload)
    }

    /// Fire-and-forget variant of [`Gateway::save`] used on every mutation.
    ///
    /// The in-memory store has already been updated when this runs, so a
    /// failure is logged rather than propagated; the session keeps operating
    /// on memory.
    pub fn persist<T: Serialize>(&self, collection: &str, value: &T) {
        if let Err(e) = self.save(collection, value) {
            log::error!("Failed to persist collection '{collection}': {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryBackend;
    use crate::NotlyError;

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn read(&self, _collection: &str) -> Result<Option<String>> {
            Err(NotlyError::Storage("disk on fire".to_string()))
        }

        fn write(&self, _collection: &str, _payload: &str) -> Result<()> {
            Err(NotlyError::Storage("disk on fire".to_string()))
        }

        fn remove(&self, _collection: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_missing_collection_returns_none() {
        let gateway = Gateway::new(Arc::new(MemoryBackend::new()));
        let loaded: Option<Vec<String>> = gateway.load("projects");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_corrupt_payload_returns_none() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("projects", "{not json").unwrap();

        let gateway = Gateway::new(backend);
        let loaded: Option<Vec<String>> = gateway.load("projects");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let gateway = Gateway::new(Arc::new(MemoryBackend::new()));
        gateway.save("tags", &vec!["a".to_string(), "b".to_string()]).unwrap();

        let loaded: Option<Vec<String>> = gateway.load("tags");
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_persist_swallows_backend_failure() {
        let gateway = Gateway::new(Arc::new(FailingBackend));
        // Must not panic or propagate; the error is logged.
        gateway.persist("cards", &vec!["c-1".to_string()]);
    }
}
