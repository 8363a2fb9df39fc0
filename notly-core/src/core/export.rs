//! Project export and import as `.notly` bundles.
//!
//! # Responsibility
//!
//! A bundle is a zip archive holding `manifest.json` (the project, its
//! boards, those boards' cards, and the referenced file entries) plus the
//! referenced asset bytes under `assets/<file_id>/<filename>`.
//!
//! Import is staged: the manifest is validated and every asset extracted
//! before the caller touches any store, so a failed import leaves the
//! application exactly as it was. Every imported entity gets a fresh id and
//! every asset a fresh local reference; an imported project never aliases
//! the original's files.
//!
//! # Invariants
//!
//! - The manifest only lists assets that were actually written into the
//!   archive; unreadable assets are skipped at export time with a warning.
//! - `import_bundle` returns either a fully staged project or an error with
//!   no staged assets left behind (cleanup is best-effort).
//! - Bundles from a newer schema (`version > BUNDLE_VERSION`) are rejected
//!   rather than half-read.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::assets::AssetBridge;
use crate::core::board::Board;
use crate::core::card::Card;
use crate::core::error::ErrorKind;
use crate::core::file_entry::{FileEntry, ImportMode};
use crate::core::project::Project;

/// Bundle schema version written into every manifest.
pub const BUNDLE_VERSION: u32 = 1;

/// File extension for bundles, checked before the container is opened.
pub const BUNDLE_EXTENSION: &str = "notly";

/// Application version stamped into exported manifests.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const MANIFEST_NAME: &str = "manifest.json";

/// Top-level JSON structure in `manifest.json`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub version: u32,
    pub app_version: String,
    pub exported_at: i64,
    pub project: Project,
    pub boards: Vec<Board>,
    pub cards: Vec<Card>,
    pub files: Vec<FileEntry>,
}

/// Bundle metadata read without importing, for the import-preview dialog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlePeek {
    pub app_version: String,
    pub project_title: String,
    pub board_count: usize,
    pub card_count: usize,
    pub file_count: usize,
}

/// A fully validated and extracted import, ready to be committed to the
/// stores. All ids are fresh and all asset references local.
#[derive(Debug)]
pub struct StagedImport {
    pub project: Project,
    pub boards: Vec<Board>,
    pub cards: Vec<Card>,
    pub files: Vec<FileEntry>,
}

/// Errors specific to bundle export/import.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a .{BUNDLE_EXTENSION} bundle: {0}")]
    WrongExtension(String),

    #[error("Bundle has no {MANIFEST_NAME}")]
    MissingManifest,

    #[error("Unsupported bundle version {found} (this app reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("Asset extraction failed: {0}")]
    Asset(String),
}

impl BundleError {
    /// Classification kind this error reports under.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Asset(_) => ErrorKind::Storage,
            Self::Zip(_)
            | Self::Json(_)
            | Self::WrongExtension(_)
            | Self::MissingManifest
            | Self::UnsupportedVersion { .. }
            | Self::InvalidBundle(_) => ErrorKind::Validation,
        }
    }

    /// Short, human-readable message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(_) => "Could not read or write the bundle file".to_string(),
            Self::Zip(_) => "This file is not a readable bundle archive".to_string(),
            Self::Json(_) => "The bundle manifest is malformed".to_string(),
            Self::WrongExtension(_) => {
                format!("Please choose a .{BUNDLE_EXTENSION} file")
            }
            Self::MissingManifest => {
                "The bundle is missing its manifest and cannot be imported".to_string()
            }
            Self::UnsupportedVersion { .. } => {
                "This bundle was created by a newer app version".to_string()
            }
            Self::InvalidBundle(msg) => format!("Invalid bundle: {msg}"),
            Self::Asset(_) => "Could not extract the bundle's files".to_string(),
        }
    }
}

/// Writes `project` and its boards, cards, and referenced assets to `dest`.
///
/// `files` is the candidate pool; only entries referenced from a board
/// snapshot or card content are archived. Assets that cannot be read are
/// skipped with a warning so the manifest never lists bytes the archive
/// does not carry.
///
/// # Errors
///
/// Returns an error when the destination cannot be written or the manifest
/// cannot be serialized.
pub fn export_bundle(
    dest: &Path,
    project: &Project,
    boards: &[Board],
    cards: &[Card],
    files: &[FileEntry],
    assets: &dyn AssetBridge,
) -> Result<(), BundleError> {
    let mut archived: Vec<(FileEntry, Vec<u8>)> = Vec::new();
    for entry in referenced_files(files, boards, cards) {
        let bytes = match entry.import_mode {
            ImportMode::Copy => assets.read_asset(&entry.path).map_err(|e| e.to_string()),
            ImportMode::Link => std::fs::read(&entry.path).map_err(|e| e.to_string()),
        };
        match bytes {
            Ok(bytes) => archived.push((entry.clone(), bytes)),
            Err(e) => log::warn!("Skipping unreadable asset '{}': {e}", entry.filename),
        }
    }

    let manifest = BundleManifest {
        version: BUNDLE_VERSION,
        app_version: APP_VERSION.to_string(),
        exported_at: Utc::now().timestamp_millis(),
        project: project.clone(),
        boards: boards.to_vec(),
        cards: cards.to_vec(),
        files: archived.iter().map(|(entry, _)| entry.clone()).collect(),
    };

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(File::create(dest)?);

    writer.start_file(MANIFEST_NAME, options)?;
    writer.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

    for (entry, bytes) in &archived {
        writer.start_file(format!("assets/{}/{}", entry.id, entry.filename), options)?;
        writer.write_all(bytes)?;
    }
    writer.finish()?;

    log::info!(
        "Exported project '{}' ({} boards, {} cards, {} assets)",
        project.title,
        manifest.boards.len(),
        manifest.cards.len(),
        manifest.files.len()
    );
    Ok(())
}

/// Reads the bundle at `path` and stages it for import: validates the
/// container, remaps every id, and extracts assets into fresh local
/// references via `assets`.
///
/// No store is touched here; the caller commits the returned
/// [`StagedImport`]. On any failure, assets extracted so far are deleted
/// best-effort.
///
/// # Errors
///
/// The failure modes are distinct so the UI can explain them: wrong
/// extension, unreadable container, missing manifest, malformed manifest,
/// unsupported version, missing asset entries, asset extraction failure.
pub fn import_bundle(
    path: &Path,
    assets: &dyn AssetBridge,
) -> Result<StagedImport, BundleError> {
    let mut archive = open_bundle(path)?;
    let manifest = read_manifest(&mut archive)?;

    // Fresh ids for every entity up front, so cross-references can be
    // rewritten in one pass.
    let mut replacements: HashMap<String, String> = HashMap::new();
    for id in std::iter::once(&manifest.project.id)
        .chain(manifest.boards.iter().map(|b| &b.id))
        .chain(manifest.cards.iter().map(|c| &c.id))
        .chain(manifest.files.iter().map(|f| &f.id))
    {
        replacements.insert(id.clone(), Uuid::new_v4().to_string());
    }

    let mut staged_refs: Vec<String> = Vec::new();
    let mut files: Vec<FileEntry> = Vec::new();
    for entry in &manifest.files {
        let entry_name = format!("assets/{}/{}", entry.id, entry.filename);
        let mut bytes = Vec::new();
        match archive.by_name(&entry_name) {
            Ok(mut stored) => {
                if let Err(e) = stored.read_to_end(&mut bytes) {
                    cleanup_staged(assets, &staged_refs);
                    return Err(BundleError::Io(e));
                }
            }
            Err(ZipError::FileNotFound) => {
                cleanup_staged(assets, &staged_refs);
                return Err(BundleError::InvalidBundle(format!(
                    "missing asset data for '{}'",
                    entry.filename
                )));
            }
            Err(e) => {
                cleanup_staged(assets, &staged_refs);
                return Err(BundleError::Zip(e));
            }
        }

        let reference = match assets.save_bytes_to_assets(&entry.filename, &bytes) {
            Ok(reference) => reference,
            Err(e) => {
                cleanup_staged(assets, &staged_refs);
                return Err(BundleError::Asset(e.to_string()));
            }
        };
        staged_refs.push(reference.clone());
        // The old asset path becomes a replacement too, so snapshots that
        // embed the path (not just the id) keep resolving.
        replacements.insert(entry.path.clone(), reference.clone());

        let mut imported = entry.clone();
        imported.id = replacements[&entry.id].clone();
        imported.path = reference;
        imported.import_mode = ImportMode::Copy;
        imported.thumbnail_path = None;
        files.push(imported);
    }

    // Longest old value first, so a path reference is rewritten before any
    // id it might embed.
    let mut ordered: Vec<(String, String)> = replacements
        .iter()
        .map(|(old, new)| (old.clone(), new.clone()))
        .collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

    let mut project = manifest.project.clone();
    project.id = replacements[&manifest.project.id].clone();
    project.thumbnail_path = None;

    let boards: Vec<Board> = manifest
        .boards
        .iter()
        .map(|board| {
            let mut imported = board.clone();
            imported.id = replacements[&board.id].clone();
            imported.project_id = project.id.clone();
            imported.snapshot = board
                .snapshot
                .as_deref()
                .map(|snapshot| apply_replacements(snapshot, &ordered));
            imported
        })
        .collect();

    let cards: Vec<Card> = manifest
        .cards
        .iter()
        .map(|card| {
            let mut imported = card.clone();
            imported.id = replacements[&card.id].clone();
            // A board id with no mapping means the bundle never carried that
            // board; the card arrives unplaced rather than dangling.
            imported.board_id = card
                .board_id
                .as_ref()
                .and_then(|id| replacements.get(id).cloned());
            imported.content = apply_replacements(&card.content, &ordered);
            // Tags are workspace-local and not bundled.
            imported.tag_ids = Vec::new();
            imported
        })
        .collect();

    log::info!(
        "Staged import of '{}' ({} boards, {} cards, {} assets)",
        project.title,
        boards.len(),
        cards.len(),
        files.len()
    );
    Ok(StagedImport { project, boards, cards, files })
}

/// Reads bundle metadata (app version, counts) without extracting anything.
///
/// # Errors
///
/// Fails with the same validation errors as [`import_bundle`].
pub fn peek_bundle(path: &Path) -> Result<BundlePeek, BundleError> {
    let mut archive = open_bundle(path)?;
    let manifest = read_manifest(&mut archive)?;
    Ok(BundlePeek {
        app_version: manifest.app_version,
        project_title: manifest.project.title,
        board_count: manifest.boards.len(),
        card_count: manifest.cards.len(),
        file_count: manifest.files.len(),
    })
}

/// Extension check happens before the container is opened, so a stray
/// `.zip` is reported as the wrong file type rather than a parse error.
fn open_bundle(path: &Path) -> Result<ZipArchive<File>, BundleError> {
    let is_bundle = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BUNDLE_EXTENSION));
    if !is_bundle {
        return Err(BundleError::WrongExtension(path.display().to_string()));
    }
    let file = File::open(path)?;
    Ok(ZipArchive::new(file)?)
}

fn read_manifest(archive: &mut ZipArchive<File>) -> Result<BundleManifest, BundleError> {
    let mut raw = String::new();
    match archive.by_name(MANIFEST_NAME) {
        Ok(mut entry) => {
            entry.read_to_string(&mut raw)?;
        }
        Err(ZipError::FileNotFound) => return Err(BundleError::MissingManifest),
        Err(e) => return Err(BundleError::Zip(e)),
    }
    let manifest: BundleManifest = serde_json::from_str(&raw)?;
    if manifest.version > BUNDLE_VERSION {
        return Err(BundleError::UnsupportedVersion {
            found: manifest.version,
            supported: BUNDLE_VERSION,
        });
    }
    Ok(manifest)
}

/// File entries whose id appears in a board snapshot or card content.
fn referenced_files<'a>(
    files: &'a [FileEntry],
    boards: &[Board],
    cards: &[Card],
) -> Vec<&'a FileEntry> {
    files
        .iter()
        .filter(|entry| {
            boards.iter().any(|board| {
                board
                    .snapshot
                    .as_deref()
                    .is_some_and(|snapshot| snapshot.contains(&entry.id))
            }) || cards.iter().any(|card| card.content.contains(&entry.id))
        })
        .collect()
}

fn apply_replacements(text: &str, ordered: &[(String, String)]) -> String {
    let mut out = text.to_string();
    for (old, new) in ordered {
        if out.contains(old.as_str()) {
            out = out.replace(old.as_str(), new.as_str());
        }
    }
    out
}

fn cleanup_staged(assets: &dyn AssetBridge, refs: &[String]) {
    for reference in refs {
        if let Err(e) = assets.delete_asset_file(reference) {
            log::warn!("Failed to clean up staged asset '{reference}': {e}");
        }
    }
}
