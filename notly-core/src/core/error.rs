//! Error types for the Notly core library.

use serde::Serialize;
use thiserror::Error;

use crate::core::export::BundleError;

/// Coarse failure classification shared with the UI layer.
///
/// Every error that reaches the front-end is reported under one of these
/// kinds so that toasts, logs, and the crash-recovery screen can treat
/// failures uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Fetch or storage-connection failure.
    Network,
    /// Quota exceeded, entity not found, unreadable collection.
    Storage,
    /// Malformed user input or a malformed import bundle.
    Validation,
    /// An unexpected exception surfaced at runtime.
    Runtime,
    /// Anything that could not be classified.
    Unknown,
}

impl ErrorKind {
    /// Classifies an arbitrary exception message (e.g. from the top-level
    /// recovery boundary) into a kind. Best-effort keyword matching;
    /// unrecognised messages land in [`ErrorKind::Runtime`].
    pub fn classify_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.is_empty() {
            Self::Unknown
        } else if lower.contains("network") || lower.contains("fetch") || lower.contains("connection") {
            Self::Network
        } else if lower.contains("quota") || lower.contains("storage") || lower.contains("not found") {
            Self::Storage
        } else if lower.contains("invalid") || lower.contains("validation") || lower.contains("parse") {
            Self::Validation
        } else {
            Self::Runtime
        }
    }
}

/// All errors that can occur within the Notly core library.
#[derive(Debug, Error)]
pub enum NotlyError {
    /// The storage backend rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entity data could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A project ID was requested that does not exist.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// A board ID was requested that does not exist.
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    /// A card ID was requested that does not exist.
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// A file entry ID was requested that does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A tag ID was requested that does not exist.
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// No journal entry exists for the given date.
    #[error("No journal entry for {0}")]
    JournalEntryNotFound(String),

    /// A version snapshot ID was requested that does not exist.
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    /// User input failed a store-level validation rule.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Bundle export/import failed; see [`BundleError`] for the cause.
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),
}

/// Convenience alias that pins the error type to [`NotlyError`].
pub type Result<T> = std::result::Result<T, NotlyError>;

impl NotlyError {
    /// Returns the classification kind this error reports under.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) | Self::Io(_) => ErrorKind::Storage,
            Self::ProjectNotFound(_)
            | Self::BoardNotFound(_)
            | Self::CardNotFound(_)
            | Self::FileNotFound(_)
            | Self::TagNotFound(_)
            | Self::JournalEntryNotFound(_)
            | Self::VersionNotFound(_) => ErrorKind::Storage,
            Self::Json(_) | Self::ValidationFailed(_) => ErrorKind::Validation,
            Self::Bundle(e) => e.kind(),
        }
    }

    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(e) => format!("Failed to save: {e}"),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::ProjectNotFound(_) => "Project no longer exists".to_string(),
            Self::BoardNotFound(_) => "Board no longer exists".to_string(),
            Self::CardNotFound(_) => "Card no longer exists".to_string(),
            Self::FileNotFound(_) => "File no longer exists".to_string(),
            Self::TagNotFound(_) => "Tag no longer exists".to_string(),
            Self::JournalEntryNotFound(date) => format!("No journal entry for {date}"),
            Self::VersionNotFound(_) => "That version no longer exists".to_string(),
            Self::ValidationFailed(msg) => msg.clone(),
            Self::Bundle(e) => e.user_message(),
        }
    }
}
