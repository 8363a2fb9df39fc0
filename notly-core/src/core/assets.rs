//! File-system bridge for imported binary assets.
//!
//! Imported files (PDFs, images, attachments) are not stored through the
//! collection backend; their bytes live under a dedicated assets directory
//! and the stores only keep a reference string. The reference format is
//! `"<uuid>/<filename>"`, resolved relative to the assets root, so the data
//! directory can be moved wholesale without rewriting entries.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{NotlyError, Result};

/// Abstraction over the asset directory so tests and the import/export codec
/// can run against temporary locations.
pub trait AssetBridge: Send + Sync {
    /// Copies `source` into the assets directory and returns the new
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the copy fails.
    fn copy_file_to_assets(&self, source: &Path) -> Result<String>;

    /// Writes raw bytes under a fresh reference with the given filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be written.
    fn save_bytes_to_assets(&self, filename: &str, bytes: &[u8]) -> Result<String>;

    /// Deletes the asset behind `reference`, including its containing
    /// directory. Deleting a reference that no longer exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset exists but cannot be removed.
    fn delete_asset_file(&self, reference: &str) -> Result<()>;

    /// Resolves `reference` to an absolute path without touching the disk.
    fn asset_path(&self, reference: &str) -> PathBuf;

    /// Reads the full contents of the asset behind `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is missing or unreadable.
    fn read_asset(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Production bridge rooted at `<data_dir>/assets`.
pub struct FsAssetBridge {
    assets_dir: PathBuf,
}

impl FsAssetBridge {
    /// Creates the bridge, ensuring the assets directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(assets_dir: P) -> Result<Self> {
        let assets_dir = assets_dir.as_ref().to_path_buf();
        fs::create_dir_all(&assets_dir)?;
        Ok(Self { assets_dir })
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    fn fresh_reference(&self, filename: &str) -> Result<(String, PathBuf)> {
        let safe_name = sanitize_filename(filename);
        let id = Uuid::new_v4().to_string();
        let dir = self.assets_dir.join(&id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(&safe_name);
        Ok((format!("{id}/{safe_name}"), path))
    }
}

impl AssetBridge for FsAssetBridge {
    fn copy_file_to_assets(&self, source: &Path) -> Result<String> {
        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                NotlyError::ValidationFailed(format!("Invalid file name: {}", source.display()))
            })?;
        let (reference, dest) = self.fresh_reference(filename)?;
        fs::copy(source, &dest)?;
        Ok(reference)
    }

    fn save_bytes_to_assets(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let (reference, dest) = self.fresh_reference(filename)?;
        fs::write(&dest, bytes)?;
        Ok(reference)
    }

    fn delete_asset_file(&self, reference: &str) -> Result<()> {
        // Remove the whole per-asset directory so thumbnails and siblings
        // stored next to the file go with it. Anything that is not an
        // `<id>/<name>` reference (absolute paths of linked files) is
        // ignored rather than resolved against the assets root.
        let dir = match reference.split_once('/') {
            Some((id, _)) if !id.is_empty() && !id.contains("..") => self.assets_dir.join(id),
            _ => return Ok(()),
        };
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn asset_path(&self, reference: &str) -> PathBuf {
        self.assets_dir.join(reference)
    }

    fn read_asset(&self, reference: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.asset_path(reference))?)
    }
}

/// Replaces filesystem-hostile characters so a user-supplied name is safe to
/// use as a file name on every platform.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
