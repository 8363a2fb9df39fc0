//! Transient UI state and persisted interface settings.
//!
//! The store splits in two: [`UiSettings`] (theme, sidebar, last active
//! project/board) round-trips through the `ui-settings` collection so the
//! app reopens where the user left off, while the open [`Modal`] is session
//! state that never touches storage.
//!
//! Modals serialize as `{"type": ..., "data": ...}` tagged objects, matching
//! the shape the front-end dispatches over the shell boundary.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::gateway::Gateway;

const COLLECTION: &str = "ui-settings";

/// Color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system preference.
    #[default]
    System,
}

/// The application's modal dialogs. At most one is open at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum Modal {
    PdfViewer { url: String, file_name: String },
    Settings,
    CardEditor { card_id: String },
    ImportProject,
    ExportProject { project_id: String },
    ConfirmDelete { entity_kind: String, entity_id: String, title: String },
}

/// Persisted interface settings, including the active entity references
/// restored on launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiSettings {
    pub theme: Theme,
    pub sidebar_open: bool,
    pub active_project_id: Option<String>,
    pub active_board_id: Option<String>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            sidebar_open: true,
            active_project_id: None,
            active_board_id: None,
        }
    }
}

/// UI state store: persisted settings plus the transient modal slot.
pub struct UiStore {
    gateway: Arc<Gateway>,
    settings: UiSettings,
    modal: Option<Modal>,
    loaded: bool,
}

impl UiStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, settings: UiSettings::default(), modal: None, loaded: false }
    }

    /// Hydrates the settings from the backend. Idempotent.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.settings = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn settings(&self) -> &UiSettings {
        &self.settings
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.settings.theme != theme {
            self.settings.theme = theme;
            self.gateway.persist(COLLECTION, &self.settings);
        }
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        if self.settings.sidebar_open != open {
            self.settings.sidebar_open = open;
            self.gateway.persist(COLLECTION, &self.settings);
        }
    }

    /// Records the active project. Switching to a different project (or to
    /// none) also clears the active board, which belonged to the old one.
    pub fn set_active_project(&mut self, project_id: Option<&str>) {
        if self.settings.active_project_id.as_deref() == project_id {
            return;
        }
        self.settings.active_project_id = project_id.map(str::to_string);
        self.settings.active_board_id = None;
        self.gateway.persist(COLLECTION, &self.settings);
    }

    pub fn set_active_board(&mut self, board_id: Option<&str>) {
        if self.settings.active_board_id.as_deref() == board_id {
            return;
        }
        self.settings.active_board_id = board_id.map(str::to_string);
        self.gateway.persist(COLLECTION, &self.settings);
    }

    /// Opens `modal`, replacing and returning any modal that was already
    /// open.
    pub fn open_modal(&mut self, modal: Modal) -> Option<Modal> {
        self.modal.replace(modal)
    }

    /// Closes and returns the open modal, if any.
    pub fn close_modal(&mut self) -> Option<Modal> {
        self.modal.take()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Nulls active references that no longer resolve, so the app never
    /// reopens onto a deleted entity. Re-persists only when something
    /// changed.
    pub(crate) fn repair_references(
        &mut self,
        project_ids: &HashSet<String>,
        board_ids: &HashSet<String>,
    ) {
        let mut changed = false;

        let project_ok = self
            .settings
            .active_project_id
            .as_ref()
            .is_some_and(|id| project_ids.contains(id));
        if self.settings.active_project_id.is_some() && !project_ok {
            log::warn!("Active project reference no longer resolves; resetting");
            self.settings.active_project_id = None;
            // The board belonged to the vanished project.
            self.settings.active_board_id = None;
            changed = true;
        }

        let board_ok = self
            .settings
            .active_board_id
            .as_ref()
            .is_some_and(|id| board_ids.contains(id));
        if self.settings.active_board_id.is_some() && !board_ok {
            log::warn!("Active board reference no longer resolves; resetting");
            self.settings.active_board_id = None;
            changed = true;
        }

        if changed {
            self.gateway.persist(COLLECTION, &self.settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryBackend;

    fn store() -> UiStore {
        let gateway = Arc::new(Gateway::new(Arc::new(MemoryBackend::new())));
        let mut store = UiStore::new(gateway);
        store.load();
        store
    }

    #[test]
    fn test_defaults_on_first_run() {
        let store = store();
        assert_eq!(store.settings().theme, Theme::System);
        assert!(store.settings().sidebar_open);
        assert!(store.settings().active_project_id.is_none());
    }

    #[test]
    fn test_settings_survive_reload() {
        let backend = Arc::new(MemoryBackend::new());
        let mut store = UiStore::new(Arc::new(Gateway::new(backend.clone())));
        store.load();
        store.set_theme(Theme::Dark);
        store.set_active_project(Some("p-1"));
        store.set_active_board(Some("b-1"));

        let mut fresh = UiStore::new(Arc::new(Gateway::new(backend)));
        fresh.load();
        assert_eq!(fresh.settings().theme, Theme::Dark);
        assert_eq!(fresh.settings().active_project_id.as_deref(), Some("p-1"));
        assert_eq!(fresh.settings().active_board_id.as_deref(), Some("b-1"));
    }

    #[test]
    fn test_switching_project_clears_board() {
        let mut store = store();
        store.set_active_project(Some("p-1"));
        store.set_active_board(Some("b-1"));

        store.set_active_project(Some("p-2"));
        assert_eq!(store.settings().active_project_id.as_deref(), Some("p-2"));
        assert!(store.settings().active_board_id.is_none());
    }

    #[test]
    fn test_at_most_one_modal_open() {
        let mut store = store();
        assert!(store.open_modal(Modal::Settings).is_none());

        let displaced = store.open_modal(Modal::ImportProject);
        assert_eq!(displaced, Some(Modal::Settings));
        assert_eq!(store.modal(), Some(&Modal::ImportProject));

        assert_eq!(store.close_modal(), Some(Modal::ImportProject));
        assert!(store.close_modal().is_none());
    }

    #[test]
    fn test_modal_serialization_shape() {
        let modal = Modal::PdfViewer {
            url: "asset://abc".to_string(),
            file_name: "paper.pdf".to_string(),
        };
        let json = serde_json::to_string(&modal).unwrap();
        assert_eq!(
            json,
            r#"{"type":"pdf-viewer","data":{"url":"asset://abc","fileName":"paper.pdf"}}"#
        );

        let unit = serde_json::to_string(&Modal::Settings).unwrap();
        assert!(unit.contains(r#""type":"settings""#));
    }

    #[test]
    fn test_repair_resets_dangling_references() {
        let mut store = store();
        store.set_active_project(Some("p-1"));
        store.set_active_board(Some("b-1"));

        let mut projects = HashSet::new();
        projects.insert("p-1".to_string());
        let boards = HashSet::new();

        // Board is gone, project survives.
        store.repair_references(&projects, &boards);
        assert_eq!(store.settings().active_project_id.as_deref(), Some("p-1"));
        assert!(store.settings().active_board_id.is_none());

        // Project gone too.
        store.set_active_board(Some("b-2"));
        store.repair_references(&HashSet::new(), &HashSet::new());
        assert!(store.settings().active_project_id.is_none());
        assert!(store.settings().active_board_id.is_none());
    }
}
