//! Internal domain modules for the Notly core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod app;
pub mod assets;
pub mod board;
pub mod card;
pub mod drag;
pub mod error;
pub mod export;
pub mod file_entry;
pub mod gateway;
pub mod journal;
pub mod presentation;
pub mod project;
pub mod shortcut;
pub mod storage;
pub mod tag;
pub mod timer;
pub mod toast;
pub mod ui;
pub mod version;

#[doc(inline)]
pub use app::AppState;
#[doc(inline)]
pub use assets::{AssetBridge, FsAssetBridge};
#[doc(inline)]
pub use board::{Board, BoardStore};
#[doc(inline)]
pub use card::{Card, CardStore, ContentKind, UpdateCard};
#[doc(inline)]
pub use drag::{Camera, CanvasViewport, DragPayload, DragSession, DropEvent, Point};
#[doc(inline)]
pub use error::{ErrorKind, NotlyError, Result};
#[doc(inline)]
pub use export::{
    export_bundle, import_bundle, peek_bundle, BundleError, BundleManifest, BundlePeek,
    StagedImport, APP_VERSION, BUNDLE_VERSION,
};
#[doc(inline)]
pub use file_entry::{FileEntry, FileStore, ImportMode};
#[doc(inline)]
pub use gateway::Gateway;
#[doc(inline)]
pub use journal::{JournalEntry, JournalStore};
#[doc(inline)]
pub use presentation::{PresentationSession, PresentationState};
#[doc(inline)]
pub use project::{Project, ProjectStore, UpdateProject};
#[doc(inline)]
pub use shortcut::{KeyCombo, KeyEvent, Shortcut, ShortcutRegistry, ShortcutScope};
#[doc(inline)]
pub use storage::{FileBackend, MemoryBackend, StorageBackend};
#[doc(inline)]
pub use tag::{Tag, TagStore};
#[doc(inline)]
pub use timer::TimerRegistry;
#[doc(inline)]
pub use toast::{NewToast, Toast, ToastStore, ToastVariant};
#[doc(inline)]
pub use ui::{Modal, Theme, UiSettings, UiStore};
#[doc(inline)]
pub use version::{Version, VersionKind, VersionStore};
