//! Version history snapshots and their store.
//!
//! Every snapshot captures the full title and content of a card or journal
//! entry at one moment. The list is append-only: recording never rewrites
//! earlier snapshots, restoring never deletes them, and entries disappear
//! only through the explicit prune operations. Deleting the underlying card
//! or journal entry keeps its history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::gateway::Gateway;
use crate::{NotlyError, Result};

const COLLECTION: &str = "versions";

/// Which entity family a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Card,
    Journal,
}

/// One recorded snapshot of an entity's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub entity_kind: VersionKind,
    /// Card id, or journal date key for [`VersionKind::Journal`].
    pub entity_id: String,
    pub title: Option<String>,
    /// Full serialized content at the time of the snapshot.
    pub content: String,
    pub created_at: i64,
}

/// Append-only collection of version snapshots.
pub struct VersionStore {
    gateway: Arc<Gateway>,
    versions: Vec<Version>,
    loaded: bool,
}

impl VersionStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, versions: Vec::new(), loaded: false }
    }

    /// Hydrates the store from the backend. Idempotent.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.versions = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Appends a snapshot for `(kind, entity_id)`.
    pub fn record(
        &mut self,
        kind: VersionKind,
        entity_id: &str,
        title: Option<String>,
        content: &str,
    ) -> Version {
        let version = Version {
            id: Uuid::new_v4().to_string(),
            entity_kind: kind,
            entity_id: entity_id.to_string(),
            title,
            content: content.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.versions.push(version.clone());
        self.gateway.persist(COLLECTION, &self.versions);
        version
    }

    /// The entity's snapshots, most recent first.
    pub fn history(&self, kind: VersionKind, entity_id: &str) -> Vec<&Version> {
        // Snapshots are appended chronologically, so reverse iteration gives
        // recency order even when timestamps collide within one millisecond.
        self.versions
            .iter()
            .rev()
            .filter(|v| v.entity_kind == kind && v.entity_id == entity_id)
            .collect()
    }

    /// Removes the snapshot with `id` and returns it (user-driven prune).
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::VersionNotFound`] if no such snapshot exists.
    pub fn delete(&mut self, id: &str) -> Result<Version> {
        let index = self
            .versions
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| NotlyError::VersionNotFound(id.to_string()))?;
        let removed = self.versions.remove(index);
        self.gateway.persist(COLLECTION, &self.versions);
        Ok(removed)
    }

    /// Removes every snapshot for `(kind, entity_id)`. Returns how many were
    /// removed.
    pub fn clear_entity(&mut self, kind: VersionKind, entity_id: &str) -> usize {
        let before = self.versions.len();
        self.versions
            .retain(|v| !(v.entity_kind == kind && v.entity_id == entity_id));
        let removed = before - self.versions.len();
        if removed > 0 {
            self.gateway.persist(COLLECTION, &self.versions);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
