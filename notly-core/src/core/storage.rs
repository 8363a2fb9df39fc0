//! Storage backends for persisted collections.
//!
//! Every domain store serializes its whole collection to a single JSON
//! payload and hands it to a [`StorageBackend`] under a stable collection
//! key (`"projects"`, `"cards"`, ...). The backend decides where the bytes
//! live: [`FileBackend`] keeps one `<key>.json` file per collection inside
//! the application data directory, while [`MemoryBackend`] holds everything
//! in a map and is used by tests and ephemeral sessions.
//!
//! Backends are deliberately dumb: no schema knowledge, no caching. The
//! typed layer on top lives in [`crate::core::gateway`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::Result;

/// Abstraction over the place persisted collections are stored.
///
/// A missing collection is not an error; `read` returns `Ok(None)` so that
/// first-run loads degrade to empty stores.
pub trait StorageBackend: Send + Sync {
    /// Reads the raw payload stored under `collection`, or `None` if the
    /// collection has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload exists but cannot be read.
    fn read(&self, collection: &str) -> Result<Option<String>>;

    /// Writes `payload` under `collection`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be written.
    fn write(&self, collection: &str, payload: &str) -> Result<()>;

    /// Removes the payload stored under `collection`. Removing a collection
    /// that was never written is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload exists but cannot be removed.
    fn remove(&self, collection: &str) -> Result<()>;
}

/// File-system backend storing one JSON file per collection.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the platform-appropriate default data directory for Notly.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Notly")
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, collection: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.collection_path(collection)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, collection: &str, payload: &str) -> Result<()> {
        fs::write(self.collection_path(collection), payload)?;
        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        match fs::remove_file(self.collection_path(collection)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBackend {
    collections: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, collection: &str) -> Result<Option<String>> {
        let collections = self.collections.lock().expect("Mutex poisoned");
        Ok(collections.get(collection).cloned())
    }

    fn write(&self, collection: &str, payload: &str) -> Result<()> {
        let mut collections = self.collections.lock().expect("Mutex poisoned");
        collections.insert(collection.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.lock().expect("Mutex poisoned");
        collections.remove(collection);
        Ok(())
    }
}
