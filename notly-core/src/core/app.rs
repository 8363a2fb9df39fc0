//! Application-level state tying every store together.
//!
//! [`AppState`] is the primary interface for the UI layer. It owns the
//! domain stores, the session-only state (toasts, presentation, drag), and
//! the asset bridge, and it carries every operation that crosses store
//! boundaries: cascading deletes, the post-load referential repair pass,
//! file import, version restore, and bundle export/import with toast
//! feedback.
//!
//! Single-store operations are reached through the public store fields;
//! only cross-cutting ones live here.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::core::assets::{AssetBridge, FsAssetBridge};
use crate::core::board::{Board, BoardStore};
use crate::core::card::{Card, CardStore};
use crate::core::drag::DragSession;
use crate::core::error::{NotlyError, Result};
use crate::core::export::{self, BundlePeek, StagedImport};
use crate::core::file_entry::{FileEntry, FileStore, ImportMode};
use crate::core::gateway::Gateway;
use crate::core::journal::JournalStore;
use crate::core::presentation::PresentationState;
use crate::core::project::{Project, ProjectStore, UpdateProject};
use crate::core::storage::{FileBackend, StorageBackend};
use crate::core::tag::{Tag, TagStore};
use crate::core::toast::{NewToast, ToastStore};
use crate::core::ui::UiStore;
use crate::core::version::{Version, VersionKind, VersionStore};

/// All application state behind the UI.
///
/// Bound to a single window and typically held behind a `Mutex` by the
/// desktop shell.
pub struct AppState {
    pub projects: ProjectStore,
    pub boards: BoardStore,
    pub cards: CardStore,
    pub files: FileStore,
    pub tags: TagStore,
    pub journal: JournalStore,
    pub versions: VersionStore,
    pub ui: UiStore,
    pub toasts: ToastStore,
    pub presentation: PresentationState,
    pub drag: DragSession,
    assets: Arc<dyn AssetBridge>,
}

impl AppState {
    /// Builds state over the given backend and asset bridge. Call
    /// [`AppState::load_all`] before first use.
    pub fn new(backend: Arc<dyn StorageBackend>, assets: Arc<dyn AssetBridge>) -> Self {
        let gateway = Arc::new(Gateway::new(backend));
        Self {
            projects: ProjectStore::new(gateway.clone()),
            boards: BoardStore::new(gateway.clone()),
            cards: CardStore::new(gateway.clone()),
            files: FileStore::new(gateway.clone()),
            tags: TagStore::new(gateway.clone()),
            journal: JournalStore::new(gateway.clone()),
            versions: VersionStore::new(gateway.clone()),
            ui: UiStore::new(gateway),
            toasts: ToastStore::new(),
            presentation: PresentationState::new(),
            drag: DragSession::new(),
            assets,
        }
    }

    /// Opens state rooted at `data_dir`: collections under
    /// `<data_dir>/collections`, assets under `<data_dir>/assets`.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created.
    pub fn open_at<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let backend = Arc::new(FileBackend::new(data_dir.join("collections"))?);
        let assets = Arc::new(FsAssetBridge::new(data_dir.join("assets"))?);
        Ok(Self::new(backend, assets))
    }

    /// Opens state in the platform-default data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Self::open_at(FileBackend::default_data_dir())
    }

    /// The asset bridge, for resolving references to displayable paths.
    pub fn assets(&self) -> &dyn AssetBridge {
        self.assets.as_ref()
    }

    /// Loads every persisted collection, then repairs cross-store
    /// references so the UI never sees an entity that did not survive.
    /// A failed collection load degrades to an empty store; it never blocks
    /// the others.
    pub fn load_all(&mut self) {
        self.projects.load();
        self.boards.load();
        self.cards.load();
        self.files.load();
        self.tags.load();
        self.journal.load();
        self.versions.load();
        self.ui.load();
        self.repair_references();
    }

    /// The join barrier after loading: prune boards whose project vanished,
    /// null card references to unknown boards and tags, and reset dangling
    /// active-entity settings.
    fn repair_references(&mut self) {
        let project_ids = self.project_ids();
        let pruned = self.boards.prune_orphans(&project_ids);
        if pruned > 0 {
            log::warn!("Pruned {pruned} boards whose project no longer exists");
        }

        let board_ids = self.board_ids();
        let tag_ids: HashSet<String> =
            self.tags.list().iter().map(|t| t.id.clone()).collect();
        let (detached, stripped) = self.cards.repair_references(&board_ids, &tag_ids);
        if detached > 0 || stripped > 0 {
            log::warn!(
                "Repaired cards: {detached} dangling board references, {stripped} unknown tags"
            );
        }

        self.ui.repair_references(&project_ids, &board_ids);
    }

    fn project_ids(&self) -> HashSet<String> {
        self.projects.list().iter().map(|p| p.id.clone()).collect()
    }

    fn board_ids(&self) -> HashSet<String> {
        self.boards.list().iter().map(|b| b.id.clone()).collect()
    }

    fn repair_ui(&mut self) {
        let project_ids = self.project_ids();
        let board_ids = self.board_ids();
        self.ui.repair_references(&project_ids, &board_ids);
    }

    /// Deletes a project and everything hanging off it: exactly its boards,
    /// those boards' card placements, its thumbnail asset, and any UI or
    /// presentation references. Cards themselves survive unplaced.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ProjectNotFound`] if no such project exists.
    pub fn delete_project(&mut self, id: &str) -> Result<Project> {
        if !self.projects.contains(id) {
            return Err(NotlyError::ProjectNotFound(id.to_string()));
        }

        let removed_boards = self.boards.delete_for_project(id);
        let removed_ids: HashSet<String> =
            removed_boards.iter().map(|b| b.id.clone()).collect();
        let detached = self.cards.detach_boards(&removed_ids);
        log::info!(
            "Deleting project '{id}': {} boards removed, {detached} cards detached",
            removed_boards.len()
        );

        let project = self.projects.delete(id)?;
        if let Some(reference) = &project.thumbnail_path {
            if let Err(e) = self.assets.delete_asset_file(reference) {
                log::warn!("Failed to delete project thumbnail '{reference}': {e}");
            }
        }

        if self.presentation.session().is_some_and(|s| s.project_id == project.id) {
            self.presentation.exit();
        }
        self.repair_ui();
        Ok(project)
    }

    /// Deletes a board, leaving its cards unplaced and renumbering the
    /// surviving sibling boards contiguously.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::BoardNotFound`] if no such board exists.
    pub fn delete_board(&mut self, id: &str) -> Result<Board> {
        let board = self.boards.delete(id)?;

        let mut removed = HashSet::new();
        removed.insert(board.id.clone());
        let detached = self.cards.detach_boards(&removed);
        if detached > 0 {
            log::info!("Detached {detached} cards from deleted board '{}'", board.id);
        }

        if self
            .presentation
            .session()
            .is_some_and(|s| s.board_ids().contains(&board.id))
        {
            self.presentation.exit();
        }
        self.repair_ui();
        Ok(board)
    }

    /// Deletes a card. Its version history is retained until pruned
    /// explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::CardNotFound`] if no such card exists.
    pub fn delete_card(&mut self, id: &str) -> Result<Card> {
        self.cards.delete(id)
    }

    /// Deletes a file entry and cleans up its binary footprint: copied
    /// asset bytes are removed (linked originals are left alone), and any
    /// cached thumbnail goes either way.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::FileNotFound`] if no such entry exists.
    pub fn delete_file(&mut self, id: &str) -> Result<FileEntry> {
        let entry = self.files.delete(id)?;

        if entry.import_mode == ImportMode::Copy {
            if let Err(e) = self.assets.delete_asset_file(&entry.path) {
                log::warn!("Failed to delete asset '{}': {e}", entry.path);
            }
        }
        if let Some(thumbnail) = &entry.thumbnail_path {
            if let Err(e) = self.assets.delete_asset_file(thumbnail) {
                log::warn!("Failed to delete thumbnail '{thumbnail}': {e}");
            }
        }
        Ok(entry)
    }

    /// Deletes a tag and strips it from every card that carried it.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::TagNotFound`] if no such tag exists.
    pub fn delete_tag(&mut self, id: &str) -> Result<Tag> {
        let tag = self.tags.delete(id)?;
        let stripped = self.cards.strip_tag(&tag.id);
        if stripped > 0 {
            log::info!("Removed tag '{}' from {stripped} cards", tag.name);
        }
        Ok(tag)
    }

    /// Attaches an existing tag to a card.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::TagNotFound`] or [`NotlyError::CardNotFound`]
    /// when either side of the assignment is missing.
    pub fn assign_tag(&mut self, card_id: &str, tag_id: &str) -> Result<()> {
        if !self.tags.contains(tag_id) {
            return Err(NotlyError::TagNotFound(tag_id.to_string()));
        }
        self.cards.add_tag(card_id, tag_id)
    }

    /// Detaches a tag from a card.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::CardNotFound`] if no such card exists.
    pub fn unassign_tag(&mut self, card_id: &str, tag_id: &str) -> Result<()> {
        self.cards.remove_tag(card_id, tag_id)
    }

    /// Registers `source` in the file library. [`ImportMode::Copy`] copies
    /// the bytes into the asset store; [`ImportMode::Link`] records the
    /// original location only.
    ///
    /// # Errors
    ///
    /// Returns an error when the source has no usable file name, cannot be
    /// inspected, or (for copies) cannot be read.
    pub fn import_file(&mut self, source: &Path, mode: ImportMode) -> Result<FileEntry> {
        let filename = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                NotlyError::ValidationFailed("File has no usable name".to_string())
            })?
            .to_string();
        let file_size = std::fs::metadata(source)?.len() as i64;
        let mime_type = mime_guess::from_path(source)
            .first()
            .map(|mime| mime.essence_str().to_string());

        let path = match mode {
            ImportMode::Copy => self.assets.copy_file_to_assets(source)?,
            ImportMode::Link => source.display().to_string(),
        };

        let now = chrono::Utc::now().timestamp_millis();
        let entry = FileEntry {
            id: Uuid::new_v4().to_string(),
            filename,
            path,
            import_mode: mode,
            file_size: Some(file_size),
            mime_type,
            page_count: None,
            thumbnail_path: None,
            created_at: now,
            updated_at: now,
        };
        self.files.insert(entry.clone());
        log::info!("Imported file '{}' ({:?})", entry.filename, mode);
        Ok(entry)
    }

    /// Stores freshly rendered thumbnail bytes for a file and removes the
    /// previous thumbnail asset, if any. Returns the new asset reference.
    ///
    /// # Errors
    ///
    /// Returns an error when the bytes cannot be written or the file entry
    /// does not exist.
    pub fn cache_file_thumbnail(&mut self, file_id: &str, bytes: &[u8]) -> Result<String> {
        let reference = self.assets.save_bytes_to_assets("thumbnail.png", bytes)?;
        let previous = match self.files.set_thumbnail(file_id, Some(reference.clone())) {
            Ok(previous) => previous,
            Err(e) => {
                // Unreferenced bytes; drop them again.
                if let Err(cleanup) = self.assets.delete_asset_file(&reference) {
                    log::warn!("Failed to clean up thumbnail '{reference}': {cleanup}");
                }
                return Err(e);
            }
        };
        if let Some(previous) = previous {
            if let Err(e) = self.assets.delete_asset_file(&previous) {
                log::warn!("Failed to delete stale thumbnail '{previous}': {e}");
            }
        }
        Ok(reference)
    }

    /// Stores cover-image bytes for a project, replacing any previous
    /// cover asset. Returns the new asset reference.
    ///
    /// # Errors
    ///
    /// Returns an error when the bytes cannot be written or the project
    /// does not exist.
    pub fn set_project_thumbnail(&mut self, project_id: &str, bytes: &[u8]) -> Result<String> {
        let reference = self.assets.save_bytes_to_assets("cover.png", bytes)?;
        let previous = self
            .projects
            .get(project_id)
            .and_then(|p| p.thumbnail_path.clone());

        let patch = UpdateProject {
            thumbnail_path: Some(reference.clone()),
            ..UpdateProject::default()
        };
        if let Err(e) = self.projects.update(project_id, patch) {
            if let Err(cleanup) = self.assets.delete_asset_file(&reference) {
                log::warn!("Failed to clean up cover '{reference}': {cleanup}");
            }
            return Err(e);
        }

        if let Some(previous) = previous {
            if let Err(e) = self.assets.delete_asset_file(&previous) {
                log::warn!("Failed to delete stale cover '{previous}': {e}");
            }
        }
        Ok(reference)
    }

    /// Snapshots a card's current title and content into its history.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::CardNotFound`] if no such card exists.
    pub fn record_card_version(&mut self, card_id: &str) -> Result<Version> {
        let (title, content) = {
            let card = self
                .cards
                .get(card_id)
                .ok_or_else(|| NotlyError::CardNotFound(card_id.to_string()))?;
            (card.title.clone(), card.content.clone())
        };
        Ok(self.versions.record(VersionKind::Card, card_id, title, &content))
    }

    /// Snapshots the journal entry for `date` into its history.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::JournalEntryNotFound`] if no entry exists for
    /// the date.
    pub fn record_journal_version(&mut self, date: &str) -> Result<Version> {
        let content = self
            .journal
            .entry(date)
            .ok_or_else(|| NotlyError::JournalEntryNotFound(date.to_string()))?
            .content
            .clone();
        Ok(self.versions.record(VersionKind::Journal, date, None, &content))
    }

    /// Applies a recorded snapshot back onto its card or journal entry. The
    /// history itself is untouched, so a restore can be undone by restoring
    /// a newer snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::VersionNotFound`] for an unknown snapshot, or
    /// the underlying store's error when the entity no longer accepts it.
    pub fn restore_version(&mut self, version_id: &str) -> Result<()> {
        let version = self
            .versions
            .get(version_id)
            .ok_or_else(|| NotlyError::VersionNotFound(version_id.to_string()))?
            .clone();

        match version.entity_kind {
            VersionKind::Card => {
                self.cards
                    .restore_snapshot(&version.entity_id, version.title, &version.content)?;
            }
            VersionKind::Journal => {
                self.journal.save_entry(&version.entity_id, &version.content)?;
            }
        }
        Ok(())
    }

    /// Exports a project with its boards, their cards, and all referenced
    /// assets to a `.notly` bundle at `dest`. The outcome is reported as a
    /// toast either way.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ProjectNotFound`] or the codec's error.
    pub fn export_bundle(&mut self, project_id: &str, dest: &Path, now: Instant) -> Result<()> {
        let Some(project) = self.projects.get(project_id).cloned() else {
            let error = NotlyError::ProjectNotFound(project_id.to_string());
            self.toasts.push(
                NewToast::error("Export failed").description(error.user_message()),
                now,
            );
            return Err(error);
        };

        let boards: Vec<Board> = self
            .boards
            .boards_for_project(project_id)
            .into_iter()
            .cloned()
            .collect();
        let mut cards: Vec<Card> = Vec::new();
        for board in &boards {
            cards.extend(self.cards.cards_for_board(&board.id).into_iter().cloned());
        }

        match export::export_bundle(
            dest,
            &project,
            &boards,
            &cards,
            self.files.list(),
            self.assets.as_ref(),
        ) {
            Ok(()) => {
                self.toasts
                    .push(NewToast::success(format!("Exported '{}'", project.title)), now);
                Ok(())
            }
            Err(e) => {
                let error = NotlyError::from(e);
                self.toasts.push(
                    NewToast::error("Export failed").description(error.user_message()),
                    now,
                );
                Err(error)
            }
        }
    }

    /// Imports a `.notly` bundle as a brand-new project. Stores are only
    /// touched once the bundle is fully staged, so a failed import leaves
    /// them exactly as they were. The outcome is reported as a toast.
    ///
    /// # Errors
    ///
    /// Returns the codec's error for an unreadable or invalid bundle.
    pub fn import_bundle(&mut self, path: &Path, now: Instant) -> Result<Project> {
        match export::import_bundle(path, self.assets.as_ref()) {
            Ok(StagedImport { project, boards, cards, files }) => {
                self.projects.insert(project.clone());
                self.boards.insert_all(boards);
                self.cards.insert_all(cards);
                self.files.insert_all(files);
                self.toasts
                    .push(NewToast::success(format!("Imported '{}'", project.title)), now);
                Ok(project)
            }
            Err(e) => {
                let error = NotlyError::from(e);
                self.toasts.push(
                    NewToast::error("Import failed").description(error.user_message()),
                    now,
                );
                Err(error)
            }
        }
    }

    /// Reads bundle metadata for the import-preview dialog without
    /// touching any store.
    ///
    /// # Errors
    ///
    /// Returns the codec's error for an unreadable or invalid bundle.
    pub fn peek_bundle(&self, path: &Path) -> Result<BundlePeek> {
        Ok(export::peek_bundle(path)?)
    }

    /// Case-insensitive card search over titles and content.
    pub fn search_cards(&self, query: &str) -> Vec<&Card> {
        self.cards.search(query)
    }

    /// Starts presenting the project's boards in their current order.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ProjectNotFound`] for an unknown project, or
    /// a validation error when it has no boards.
    pub fn start_presentation(&mut self, project_id: &str) -> Result<()> {
        if !self.projects.contains(project_id) {
            return Err(NotlyError::ProjectNotFound(project_id.to_string()));
        }
        let board_ids: Vec<String> = self
            .boards
            .boards_for_project(project_id)
            .iter()
            .map(|b| b.id.clone())
            .collect();
        self.presentation.start(project_id, board_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::ContentKind;
    use crate::core::storage::MemoryBackend;
    use crate::core::toast::ToastVariant;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> AppState {
        let backend = Arc::new(MemoryBackend::new());
        let assets = Arc::new(FsAssetBridge::new(dir.path().join("assets")).unwrap());
        let mut state = AppState::new(backend, assets);
        state.load_all();
        state
    }

    fn app_on(backend: Arc<MemoryBackend>, dir: &TempDir) -> AppState {
        let assets = Arc::new(FsAssetBridge::new(dir.path().join("assets")).unwrap());
        let mut state = AppState::new(backend, assets);
        state.load_all();
        state
    }

    #[test]
    fn test_delete_project_cascades_to_exactly_its_boards() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let p1 = state.projects.create("One", None);
        let p2 = state.projects.create("Two", None);
        let b1 = state.boards.create(&p1.id, "A");
        let b2 = state.boards.create(&p1.id, "B");
        let b3 = state.boards.create(&p2.id, "C");
        let c1 = state.cards.create(Some(&b1.id), None, "on A", ContentKind::Text);
        let c2 = state.cards.create(Some(&b2.id), None, "on B", ContentKind::Text);
        let c3 = state.cards.create(Some(&b3.id), None, "on C", ContentKind::Text);

        state.delete_project(&p1.id).unwrap();

        assert!(state.projects.get(&p1.id).is_none());
        assert!(state.boards.get(&b1.id).is_none());
        assert!(state.boards.get(&b2.id).is_none());
        assert!(state.boards.get(&b3.id).is_some());

        // Cards survive unplaced; the other project's card is untouched.
        assert!(state.cards.get(&c1.id).unwrap().board_id.is_none());
        assert!(state.cards.get(&c2.id).unwrap().board_id.is_none());
        assert_eq!(state.cards.get(&c3.id).unwrap().board_id.as_deref(), Some(b3.id.as_str()));
    }

    #[test]
    fn test_delete_project_requires_existing_project() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);
        assert!(matches!(
            state.delete_project("ghost"),
            Err(NotlyError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn test_delete_board_renumbers_siblings() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let p = state.projects.create("P", None);
        let _b1 = state.boards.create(&p.id, "first");
        let b2 = state.boards.create(&p.id, "second");
        let _b3 = state.boards.create(&p.id, "third");

        state.delete_board(&b2.id).unwrap();

        let remaining = state.boards.boards_for_project(&p.id);
        let positions: Vec<i32> = remaining.iter().map(|b| b.position).collect();
        let titles: Vec<&str> = remaining.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(titles, vec!["first", "third"]);
    }

    #[test]
    fn test_deletes_clear_active_ui_references() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let p = state.projects.create("P", None);
        let b = state.boards.create(&p.id, "B");
        state.ui.set_active_project(Some(&p.id));
        state.ui.set_active_board(Some(&b.id));

        state.delete_board(&b.id).unwrap();
        assert!(state.ui.settings().active_board_id.is_none());
        assert_eq!(state.ui.settings().active_project_id.as_deref(), Some(p.id.as_str()));

        state.delete_project(&p.id).unwrap();
        assert!(state.ui.settings().active_project_id.is_none());
    }

    #[test]
    fn test_delete_project_ends_its_presentation() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let p = state.projects.create("P", None);
        state.boards.create(&p.id, "B");
        state.start_presentation(&p.id).unwrap();
        assert!(state.presentation.is_active());

        state.delete_project(&p.id).unwrap();
        assert!(!state.presentation.is_active());
    }

    #[test]
    fn test_load_repairs_dangling_references() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new());

        // Seed collections with a board whose project never existed and a
        // card sitting on that board.
        let gateway = Gateway::new(backend.clone());
        let orphan = Board {
            id: "b-ghost".to_string(),
            project_id: "p-ghost".to_string(),
            title: "Orphan".to_string(),
            position: 0,
            snapshot: None,
            created_at: 0,
            updated_at: 0,
        };
        gateway.save("boards", &vec![orphan]).unwrap();
        let card = Card {
            id: "c-1".to_string(),
            board_id: Some("b-ghost".to_string()),
            title: None,
            content: "stranded".to_string(),
            content_kind: ContentKind::Text,
            color: None,
            tag_ids: vec!["t-ghost".to_string()],
            word_count: 1,
            created_at: 0,
            updated_at: 0,
        };
        gateway.save("cards", &vec![card]).unwrap();

        let state = app_on(backend, &dir);
        assert!(state.boards.is_empty());
        let repaired = state.cards.get("c-1").unwrap();
        assert!(repaired.board_id.is_none());
        assert!(repaired.tag_ids.is_empty());
    }

    #[test]
    fn test_deleted_entities_stay_deleted_across_reload() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new());

        let mut state = app_on(backend.clone(), &dir);
        let p = state.projects.create("P", None);
        let b = state.boards.create(&p.id, "B");
        let c = state.cards.create(Some(&b.id), None, "x", ContentKind::Text);
        state.delete_project(&p.id).unwrap();

        let reloaded = app_on(backend, &dir);
        assert!(reloaded.projects.is_empty());
        assert!(reloaded.boards.is_empty());
        // The detached card stays unplaced; its board ref must not resurrect.
        assert!(reloaded.cards.get(&c.id).unwrap().board_id.is_none());
        assert!(reloaded.cards.cards_for_board(&b.id).is_empty());
    }

    #[test]
    fn test_import_file_copy_and_delete_cleans_assets() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let source = dir.path().join("pic.png");
        std::fs::write(&source, b"imgdata").unwrap();

        let entry = state.import_file(&source, ImportMode::Copy).unwrap();
        assert_eq!(entry.import_mode, ImportMode::Copy);
        assert_eq!(entry.file_size, Some(7));
        assert_eq!(entry.mime_type.as_deref(), Some("image/png"));
        assert_eq!(state.assets().read_asset(&entry.path).unwrap(), b"imgdata");

        state.delete_file(&entry.id).unwrap();
        assert!(state.assets().read_asset(&entry.path).is_err());
        assert!(state.files.is_empty());
    }

    #[test]
    fn test_import_file_link_keeps_original_path() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let source = dir.path().join("doc.pdf");
        std::fs::write(&source, b"%PDF").unwrap();

        let entry = state.import_file(&source, ImportMode::Link).unwrap();
        assert_eq!(entry.path, source.display().to_string());

        // Deleting a linked entry must not touch the original file.
        state.delete_file(&entry.id).unwrap();
        assert!(source.exists());
    }

    #[test]
    fn test_delete_tag_strips_card_references() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let tag = state.tags.create("urgent", None).unwrap();
        let card = state.cards.create(None, None, "x", ContentKind::Text);
        state.assign_tag(&card.id, &tag.id).unwrap();
        assert_eq!(state.cards.get(&card.id).unwrap().tag_ids, vec![tag.id.clone()]);

        state.delete_tag(&tag.id).unwrap();
        assert!(state.cards.get(&card.id).unwrap().tag_ids.is_empty());
        assert!(matches!(
            state.assign_tag(&card.id, &tag.id),
            Err(NotlyError::TagNotFound(_))
        ));
    }

    #[test]
    fn test_version_record_and_restore_keeps_history() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let card = state.cards.create(None, Some("Draft".to_string()), "v1", ContentKind::Text);
        let version = state.record_card_version(&card.id).unwrap();

        state
            .cards
            .update(&card.id, crate::core::card::UpdateCard {
                content: Some("v2".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(state.cards.get(&card.id).unwrap().content, "v2");

        state.restore_version(&version.id).unwrap();
        let restored = state.cards.get(&card.id).unwrap();
        assert_eq!(restored.content, "v1");
        assert_eq!(restored.title.as_deref(), Some("Draft"));
        assert_eq!(state.versions.history(VersionKind::Card, &card.id).len(), 1);
    }

    #[test]
    fn test_journal_version_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        state.journal.save_entry("2026-01-05", "first draft").unwrap();
        let version = state.record_journal_version("2026-01-05").unwrap();
        state.journal.save_entry("2026-01-05", "rewritten").unwrap();

        state.restore_version(&version.id).unwrap();
        assert_eq!(state.journal.entry("2026-01-05").unwrap().content, "first draft");
    }

    #[test]
    fn test_export_then_import_duplicates_without_aliasing() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);
        let t0 = Instant::now();

        let source = dir.path().join("pic.png");
        std::fs::write(&source, b"imgdata").unwrap();
        let entry = state.import_file(&source, ImportMode::Copy).unwrap();

        let project = state.projects.create("Research", None);
        let board = state.boards.create(&project.id, "Main");
        state
            .boards
            .save_snapshot(&board.id, &format!(r#"{{"asset":"{}","fileId":"{}"}}"#, entry.path, entry.id))
            .unwrap();
        state.cards.create(Some(&board.id), None, "note", ContentKind::Text);

        let dest = dir.path().join("research.notly");
        state.export_bundle(&project.id, &dest, t0).unwrap();
        assert_eq!(state.toasts.toasts()[0].variant, ToastVariant::Success);

        let imported = state.import_bundle(&dest, t0).unwrap();
        assert_ne!(imported.id, project.id);
        assert_eq!(state.projects.len(), 2);

        let imported_boards = state.boards.boards_for_project(&imported.id);
        assert_eq!(imported_boards.len(), 1);
        let imported_cards = state.cards.cards_for_board(&imported_boards[0].id);
        assert_eq!(imported_cards.len(), 1);
        assert_eq!(imported_cards[0].content, "note");

        // The imported copy got its own asset; both resolve independently.
        let imported_file = state
            .files
            .list()
            .iter()
            .find(|f| f.id != entry.id)
            .unwrap()
            .clone();
        assert_ne!(imported_file.path, entry.path);
        assert_eq!(state.assets().read_asset(&imported_file.path).unwrap(), b"imgdata");
        assert_eq!(state.assets().read_asset(&entry.path).unwrap(), b"imgdata");

        let snapshot = imported_boards[0].snapshot.as_deref().unwrap();
        assert!(snapshot.contains(&imported_file.path));
        assert!(!snapshot.contains(&entry.path));
    }

    #[test]
    fn test_failed_import_leaves_stores_untouched() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);
        let t0 = Instant::now();
        state.projects.create("Existing", None);

        let result = state.import_bundle(&dir.path().join("backup.zip"), t0);
        assert!(result.is_err());
        assert_eq!(state.projects.len(), 1);
        assert!(state.boards.is_empty());

        let toast = &state.toasts.toasts()[0];
        assert_eq!(toast.variant, ToastVariant::Error);
        assert_eq!(toast.title, "Import failed");
    }

    #[test]
    fn test_start_presentation_requires_boards() {
        let dir = TempDir::new().unwrap();
        let mut state = app(&dir);

        let empty = state.projects.create("Empty", None);
        assert!(state.start_presentation(&empty.id).is_err());
        assert!(matches!(
            state.start_presentation("ghost"),
            Err(NotlyError::ProjectNotFound(_))
        ));

        let p = state.projects.create("Full", None);
        let b1 = state.boards.create(&p.id, "One");
        state.boards.create(&p.id, "Two");
        state.start_presentation(&p.id).unwrap();
        assert_eq!(state.presentation.current_board(), Some(b1.id.as_str()));
        assert_eq!(state.presentation.position(), Some((0, 2)));
    }
}
