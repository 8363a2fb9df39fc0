//! Tag entities and their store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::gateway::Gateway;
use crate::{NotlyError, Result};

const COLLECTION: &str = "tags";

/// A label that can be attached to cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: i64,
}

/// In-memory collection of tags. Names are unique case-insensitively; the
/// original casing is preserved for display.
pub struct TagStore {
    gateway: Arc<Gateway>,
    tags: Vec<Tag>,
    loaded: bool,
}

impl TagStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, tags: Vec::new(), loaded: false }
    }

    /// Hydrates the store from the backend. Idempotent.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.tags = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Creates a tag with a trimmed, unique name.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ValidationFailed`] if the name is empty after
    /// trimming or collides (case-insensitively) with an existing tag.
    pub fn create(&mut self, name: &str, color: Option<String>) -> Result<Tag> {
        let name = self.validate_name(name, None)?;
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name,
            color,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.tags.push(tag.clone());
        self.gateway.persist(COLLECTION, &self.tags);
        Ok(tag)
    }

    /// Renames the tag with `id` under the same rules as [`TagStore::create`].
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::TagNotFound`] if no such tag exists, or
    /// [`NotlyError::ValidationFailed`] for an empty or colliding name.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<Tag> {
        let name = self.validate_name(name, Some(id))?;
        let tag = self
            .tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| NotlyError::TagNotFound(id.to_string()))?;
        tag.name = name;
        let renamed = tag.clone();
        self.gateway.persist(COLLECTION, &self.tags);
        Ok(renamed)
    }

    /// Removes the tag with `id` and returns it. Stripping the tag from
    /// cards is the application layer's job.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::TagNotFound`] if no such tag exists.
    pub fn delete(&mut self, id: &str) -> Result<Tag> {
        let index = self
            .tags
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| NotlyError::TagNotFound(id.to_string()))?;
        let removed = self.tags.remove(index);
        self.gateway.persist(COLLECTION, &self.tags);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Case-insensitive lookup by name.
    pub fn get_by_name(&self, name: &str) -> Option<&Tag> {
        let needle = name.trim().to_lowercase();
        self.tags.iter().find(|t| t.name.to_lowercase() == needle)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tags.iter().any(|t| t.id == id)
    }

    pub fn list(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn validate_name(&self, name: &str, exclude_id: Option<&str>) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(NotlyError::ValidationFailed("Tag name must not be empty".to_string()));
        }
        let lower = trimmed.to_lowercase();
        let collides = self
            .tags
            .iter()
            .any(|t| Some(t.id.as_str()) != exclude_id && t.name.to_lowercase() == lower);
        if collides {
            return Err(NotlyError::ValidationFailed(format!("Tag '{trimmed}' already exists")));
        }
        Ok(trimmed.to_string())
    }
}
