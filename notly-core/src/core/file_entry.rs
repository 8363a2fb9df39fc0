//! Imported file entries and their store.
//!
//! An entry records metadata about a binary the user brought into the app.
//! `Copy` imports own their bytes under the assets directory (via
//! [`crate::core::assets::AssetBridge`]) and `path` holds the asset
//! reference; `Link` imports point at the original file on disk and `path`
//! holds that absolute path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::gateway::Gateway;
use crate::{NotlyError, Result};

const COLLECTION: &str = "files";

/// Whether an import copied the bytes or linked to the original location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    Copy,
    Link,
}

/// Metadata for one imported file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub filename: String,
    /// Asset reference (`Copy`) or absolute source path (`Link`).
    pub path: String,
    pub import_mode: ImportMode,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    /// Page count for paged documents, filled in by the viewer on first open.
    pub page_count: Option<i32>,
    /// Asset reference of the rendered preview thumbnail.
    pub thumbnail_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// In-memory collection of file entries.
pub struct FileStore {
    gateway: Arc<Gateway>,
    files: Vec<FileEntry>,
    loaded: bool,
}

impl FileStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, files: Vec::new(), loaded: false }
    }

    /// Hydrates the store from the backend. Idempotent.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.files = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Registers an already-built entry. Construction happens in the
    /// application layer, which owns the asset bridge.
    pub(crate) fn insert(&mut self, entry: FileEntry) {
        self.files.push(entry);
        self.gateway.persist(COLLECTION, &self.files);
    }

    pub(crate) fn insert_all(&mut self, entries: Vec<FileEntry>) {
        self.files.extend(entries);
        self.gateway.persist(COLLECTION, &self.files);
    }

    /// Renames the entry with `id` (display name only; the stored bytes and
    /// path are untouched).
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::FileNotFound`] if no such entry exists.
    pub fn rename(&mut self, id: &str, filename: &str) -> Result<FileEntry> {
        let entry = self.entry_mut(id)?;
        entry.filename = filename.to_string();
        entry.updated_at = chrono::Utc::now().timestamp_millis();
        let renamed = entry.clone();
        self.gateway.persist(COLLECTION, &self.files);
        Ok(renamed)
    }

    /// Replaces the thumbnail reference, returning the previous one so the
    /// caller can delete the orphaned asset.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::FileNotFound`] if no such entry exists.
    pub(crate) fn set_thumbnail(&mut self, id: &str, reference: Option<String>) -> Result<Option<String>> {
        let entry = self.entry_mut(id)?;
        let previous = std::mem::replace(&mut entry.thumbnail_path, reference);
        entry.updated_at = chrono::Utc::now().timestamp_millis();
        self.gateway.persist(COLLECTION, &self.files);
        Ok(previous)
    }

    /// Records the page count reported by the document viewer.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::FileNotFound`] if no such entry exists.
    pub fn set_page_count(&mut self, id: &str, pages: i32) -> Result<()> {
        let entry = self.entry_mut(id)?;
        entry.page_count = Some(pages);
        entry.updated_at = chrono::Utc::now().timestamp_millis();
        self.gateway.persist(COLLECTION, &self.files);
        Ok(())
    }

    /// Removes the entry with `id` and returns it. Asset cleanup is the
    /// application layer's job.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::FileNotFound`] if no such entry exists.
    pub fn delete(&mut self, id: &str) -> Result<FileEntry> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| NotlyError::FileNotFound(id.to_string()))?;
        let removed = self.files.remove(index);
        self.gateway.persist(COLLECTION, &self.files);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.files.iter().any(|f| f.id == id)
    }

    pub fn list(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut FileEntry> {
        self.files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| NotlyError::FileNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryBackend;
    use uuid::Uuid;

    fn store() -> FileStore {
        let gateway = Arc::new(Gateway::new(Arc::new(MemoryBackend::new())));
        let mut store = FileStore::new(gateway);
        store.load();
        store
    }

    fn entry(filename: &str) -> FileEntry {
        let now = chrono::Utc::now().timestamp_millis();
        FileEntry {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            path: format!("ref/{filename}"),
            import_mode: ImportMode::Copy,
            file_size: Some(1024),
            mime_type: Some("application/pdf".to_string()),
            page_count: None,
            thumbnail_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = store();
        let e = entry("paper.pdf");
        let id = e.id.clone();
        store.insert(e);

        assert_eq!(store.get(&id).unwrap().filename, "paper.pdf");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_thumbnail_returns_previous_reference() {
        let mut store = store();
        let e = entry("doc.pdf");
        let id = e.id.clone();
        store.insert(e);

        let old = store.set_thumbnail(&id, Some("thumb/1.png".to_string())).unwrap();
        assert!(old.is_none());

        let old = store.set_thumbnail(&id, Some("thumb/2.png".to_string())).unwrap();
        assert_eq!(old.as_deref(), Some("thumb/1.png"));
    }

    #[test]
    fn test_set_page_count() {
        let mut store = store();
        let e = entry("book.pdf");
        let id = e.id.clone();
        store.insert(e);

        store.set_page_count(&id, 42).unwrap();
        assert_eq!(store.get(&id).unwrap().page_count, Some(42));
        assert!(store.set_page_count("missing", 1).is_err());
    }

    #[test]
    fn test_delete_missing_entry_fails() {
        let mut store = store();
        assert!(matches!(store.delete("nope"), Err(NotlyError::FileNotFound(_))));
    }
}
