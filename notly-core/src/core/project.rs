//! Project entities and their store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::gateway::Gateway;
use crate::{NotlyError, Result};

const COLLECTION: &str = "projects";

/// A top-level container for boards, cards, and files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
    /// Asset reference of the rendered thumbnail, if one has been captured.
    pub thumbnail_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Patch applied by [`ProjectStore::update`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub thumbnail_path: Option<String>,
}

/// In-memory collection of projects, persisted as one JSON array.
pub struct ProjectStore {
    gateway: Arc<Gateway>,
    projects: Vec<Project>,
    loaded: bool,
}

impl ProjectStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, projects: Vec::new(), loaded: false }
    }

    /// Hydrates the store from the backend. Idempotent: once loaded, further
    /// calls return without touching storage.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.projects = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Creates a project and persists the collection.
    pub fn create(&mut self, title: &str, description: Option<String>) -> Project {
        let now = chrono::Utc::now().timestamp_millis();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description,
            color: None,
            thumbnail_path: None,
            created_at: now,
            updated_at: now,
        };
        self.projects.push(project.clone());
        self.gateway.persist(COLLECTION, &self.projects);
        project
    }

    /// Applies `patch` to the project with `id` and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ProjectNotFound`] if no such project exists.
    pub fn update(&mut self, id: &str, patch: UpdateProject) -> Result<Project> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| NotlyError::ProjectNotFound(id.to_string()))?;

        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(description) = patch.description {
            project.description = Some(description);
        }
        if let Some(color) = patch.color {
            project.color = Some(color);
        }
        if let Some(thumbnail_path) = patch.thumbnail_path {
            project.thumbnail_path = Some(thumbnail_path);
        }
        project.updated_at = chrono::Utc::now().timestamp_millis();

        let updated = project.clone();
        self.gateway.persist(COLLECTION, &self.projects);
        Ok(updated)
    }

    /// Removes the project with `id` and returns it. Cascading deletion of
    /// dependent entities is the application layer's job.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ProjectNotFound`] if no such project exists.
    pub fn delete(&mut self, id: &str) -> Result<Project> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| NotlyError::ProjectNotFound(id.to_string()))?;
        let removed = self.projects.remove(index);
        self.gateway.persist(COLLECTION, &self.projects);
        Ok(removed)
    }

    pub(crate) fn insert(&mut self, project: Project) {
        self.projects.push(project);
        self.gateway.persist(COLLECTION, &self.projects);
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{MemoryBackend, StorageBackend};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend wrapper that counts reads, for load-once verification.
    struct CountingBackend {
        inner: MemoryBackend,
        reads: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self { inner: MemoryBackend::new(), reads: AtomicUsize::new(0) }
        }
    }

    impl StorageBackend for CountingBackend {
        fn read(&self, collection: &str) -> Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(collection)
        }

        fn write(&self, collection: &str, payload: &str) -> Result<()> {
            self.inner.write(collection, payload)
        }

        fn remove(&self, collection: &str) -> Result<()> {
            self.inner.remove(collection)
        }
    }

    fn store() -> ProjectStore {
        let gateway = Arc::new(Gateway::new(Arc::new(MemoryBackend::new())));
        let mut store = ProjectStore::new(gateway);
        store.load();
        store
    }

    #[test]
    fn test_create_assigns_id_and_timestamps() {
        let mut store = store();
        let project = store.create("Thesis", Some("Research notes".to_string()));

        assert!(!project.id.is_empty());
        assert_eq!(project.title, "Thesis");
        assert_eq!(project.created_at, project.updated_at);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_patches_only_given_fields() {
        let mut store = store();
        let project = store.create("Old", None);

        let updated = store
            .update(&project.id, UpdateProject { title: Some("New".to_string()), ..Default::default() })
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, None);
        assert!(updated.updated_at >= project.updated_at);
    }

    #[test]
    fn test_update_missing_project_fails() {
        let mut store = store();
        let result = store.update("nope", UpdateProject::default());
        assert!(matches!(result, Err(NotlyError::ProjectNotFound(_))));
    }

    #[test]
    fn test_delete_returns_removed_project() {
        let mut store = store();
        let project = store.create("Doomed", None);

        let removed = store.delete(&project.id).unwrap();
        assert_eq!(removed.id, project.id);
        assert!(store.is_empty());
        assert!(store.delete(&project.id).is_err());
    }

    #[test]
    fn test_load_reads_storage_exactly_once() {
        let backend = Arc::new(CountingBackend::new());
        let gateway = Arc::new(Gateway::new(backend.clone()));

        let mut store = ProjectStore::new(gateway);
        store.load();
        store.load();
        store.load();
        assert_eq!(backend.reads.load(Ordering::SeqCst), 1);
        assert!(store.is_loaded());
    }

    #[test]
    fn test_mutations_survive_reload() {
        let backend = Arc::new(MemoryBackend::new());
        let gateway = Arc::new(Gateway::new(backend.clone()));

        let mut store = ProjectStore::new(gateway);
        store.load();
        let project = store.create("Persisted", None);

        let mut fresh = ProjectStore::new(Arc::new(Gateway::new(backend)));
        fresh.load();
        assert_eq!(fresh.get(&project.id).map(|p| p.title.as_str()), Some("Persisted"));
    }
}
