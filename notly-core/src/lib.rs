//! Core library for Notly, a local-first visual note-taking application.
//!
//! The primary entry point is [`AppState`], which owns the domain stores
//! (projects, boards, cards, files, tags, journal, version history), the
//! session state (toasts, presentation mode, drag-and-drop), and the asset
//! bridge. All cross-store mutations go through `AppState` methods;
//! single-store operations are reached through its public store fields.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core`
//! module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    app::AppState,
    assets::{sanitize_filename, AssetBridge, FsAssetBridge},
    board::{Board, BoardStore},
    card::{word_count, Card, CardStore, ContentKind, UpdateCard},
    drag::{Camera, CanvasViewport, DragPayload, DragSession, DropEvent, Point},
    error::{ErrorKind, NotlyError, Result},
    export::{
        export_bundle, import_bundle, peek_bundle, BundleError, BundleManifest, BundlePeek,
        StagedImport, APP_VERSION, BUNDLE_EXTENSION, BUNDLE_VERSION,
    },
    file_entry::{FileEntry, FileStore, ImportMode},
    gateway::Gateway,
    journal::{JournalEntry, JournalStore},
    presentation::{PresentationSession, PresentationState},
    project::{Project, ProjectStore, UpdateProject},
    shortcut::{FocusTarget, KeyCombo, KeyEvent, Match, Shortcut, ShortcutRegistry, ShortcutScope},
    storage::{FileBackend, MemoryBackend, StorageBackend},
    tag::{Tag, TagStore},
    timer::TimerRegistry,
    toast::{NewToast, Toast, ToastStore, ToastVariant, TOAST_LIMIT, TOAST_REMOVE_DELAY},
    ui::{Modal, Theme, UiSettings, UiStore},
    version::{Version, VersionKind, VersionStore},
};
