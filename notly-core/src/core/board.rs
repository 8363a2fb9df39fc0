//! Whiteboard entities and their store.
//!
//! Boards belong to a project and carry an opaque canvas snapshot (the
//! serialized whiteboard document produced by the drawing surface). Within a
//! project, `position` is always contiguous from zero; create, delete, and
//! reorder all maintain that invariant.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::gateway::Gateway;
use crate::{NotlyError, Result};

const COLLECTION: &str = "boards";

/// A single whiteboard inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub project_id: String,
    pub title: String,
    /// Zero-based order within the owning project.
    pub position: i32,
    /// Serialized canvas document; `None` until first saved.
    pub snapshot: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// In-memory collection of boards across all projects.
pub struct BoardStore {
    gateway: Arc<Gateway>,
    boards: Vec<Board>,
    loaded: bool,
}

impl BoardStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, boards: Vec::new(), loaded: false }
    }

    /// Hydrates the store from the backend. Idempotent.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.boards = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Creates a board at the end of the project's board list.
    pub fn create(&mut self, project_id: &str, title: &str) -> Board {
        let now = chrono::Utc::now().timestamp_millis();
        let position = self.boards.iter().filter(|b| b.project_id == project_id).count() as i32;
        let board = Board {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            title: title.to_string(),
            position,
            snapshot: None,
            created_at: now,
            updated_at: now,
        };
        self.boards.push(board.clone());
        self.gateway.persist(COLLECTION, &self.boards);
        board
    }

    /// Renames the board with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::BoardNotFound`] if no such board exists.
    pub fn rename(&mut self, id: &str, title: &str) -> Result<Board> {
        let board = self.board_mut(id)?;
        board.title = title.to_string();
        board.updated_at = chrono::Utc::now().timestamp_millis();
        let renamed = board.clone();
        self.gateway.persist(COLLECTION, &self.boards);
        Ok(renamed)
    }

    /// Replaces the stored canvas snapshot for the board with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::BoardNotFound`] if no such board exists.
    pub fn save_snapshot(&mut self, id: &str, snapshot: &str) -> Result<()> {
        let board = self.board_mut(id)?;
        board.snapshot = Some(snapshot.to_string());
        board.updated_at = chrono::Utc::now().timestamp_millis();
        self.gateway.persist(COLLECTION, &self.boards);
        Ok(())
    }

    /// Removes the board with `id`, renumbering the project's remaining
    /// boards contiguously. Card detachment is the application layer's job.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::BoardNotFound`] if no such board exists.
    pub fn delete(&mut self, id: &str) -> Result<Board> {
        let index = self
            .boards
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| NotlyError::BoardNotFound(id.to_string()))?;
        let removed = self.boards.remove(index);
        self.renumber(&removed.project_id);
        self.gateway.persist(COLLECTION, &self.boards);
        Ok(removed)
    }

    /// Reorders a project's boards to match `ordered_ids`, renumbering
    /// positions contiguously from zero.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ValidationFailed`] unless `ordered_ids` names
    /// exactly the boards belonging to `project_id`.
    pub fn reorder(&mut self, project_id: &str, ordered_ids: &[String]) -> Result<()> {
        let current: HashSet<&str> = self
            .boards
            .iter()
            .filter(|b| b.project_id == project_id)
            .map(|b| b.id.as_str())
            .collect();
        let requested: HashSet<&str> = ordered_ids.iter().map(String::as_str).collect();
        if current != requested || ordered_ids.len() != current.len() {
            return Err(NotlyError::ValidationFailed(
                "Reorder must list each board of the project exactly once".to_string(),
            ));
        }

        for board in &mut self.boards {
            if board.project_id == project_id {
                // Membership was validated above, so the lookup cannot miss.
                if let Some(position) = ordered_ids.iter().position(|id| *id == board.id) {
                    board.position = position as i32;
                }
            }
        }
        self.gateway.persist(COLLECTION, &self.boards);
        Ok(())
    }

    /// Removes every board belonging to `project_id` and returns them.
    pub(crate) fn delete_for_project(&mut self, project_id: &str) -> Vec<Board> {
        let mut removed = Vec::new();
        self.boards.retain(|b| {
            if b.project_id == project_id {
                removed.push(b.clone());
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            self.gateway.persist(COLLECTION, &self.boards);
        }
        removed
    }

    /// Drops boards whose project no longer exists. Returns how many were
    /// removed; the collection is re-persisted only when something changed.
    pub(crate) fn prune_orphans(&mut self, project_ids: &HashSet<String>) -> usize {
        let before = self.boards.len();
        self.boards.retain(|b| project_ids.contains(&b.project_id));
        let removed = before - self.boards.len();
        if removed > 0 {
            self.gateway.persist(COLLECTION, &self.boards);
        }
        removed
    }

    pub(crate) fn insert_all(&mut self, boards: Vec<Board>) {
        self.boards.extend(boards);
        self.gateway.persist(COLLECTION, &self.boards);
    }

    /// The project's boards sorted by position.
    pub fn boards_for_project(&self, project_id: &str) -> Vec<&Board> {
        let mut boards: Vec<&Board> =
            self.boards.iter().filter(|b| b.project_id == project_id).collect();
        boards.sort_by_key(|b| b.position);
        boards
    }

    pub fn get(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.boards.iter().any(|b| b.id == id)
    }

    pub fn list(&self) -> &[Board] {
        &self.boards
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    fn board_mut(&mut self, id: &str) -> Result<&mut Board> {
        self.boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| NotlyError::BoardNotFound(id.to_string()))
    }

    fn renumber(&mut self, project_id: &str) {
        let mut ids: Vec<(i32, String)> = self
            .boards
            .iter()
            .filter(|b| b.project_id == project_id)
            .map(|b| (b.position, b.id.clone()))
            .collect();
        ids.sort();
        for (new_position, (_, id)) in ids.into_iter().enumerate() {
            if let Some(board) = self.boards.iter_mut().find(|b| b.id == id) {
                board.position = new_position as i32;
            }
        }
    }
}
