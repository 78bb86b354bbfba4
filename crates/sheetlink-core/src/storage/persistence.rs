//! Filesystem document persistence
//!
//! Each document lives at `{root}/{category}/{key}.{extension}`. Full writes
//! go through a temp file and a rename so a document is never left
//! partially written; appends open the file in append mode.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{StoreError, StoreResult};
use super::DocumentStore;
use crate::reference::DocumentId;

/// Document store rooted at an output directory
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
    extension: String,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a document
    pub fn path_of(&self, doc: &DocumentId) -> PathBuf {
        self.root.join(doc.to_path(&self.extension))
    }
}

impl DocumentStore for FsDocumentStore {
    fn exists(&self, doc: &DocumentId) -> bool {
        self.path_of(doc).is_file()
    }

    fn read(&self, doc: &DocumentId) -> StoreResult<Option<String>> {
        let path = self.path_of(doc);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::from_read(e, path)),
        }
    }

    fn write(&self, doc: &DocumentId, content: &str) -> StoreResult<()> {
        atomic_write(&self.path_of(doc), content.as_bytes())
    }

    fn append(&self, doc: &DocumentId, content: &str) -> StoreResult<()> {
        let path = self.path_of(doc);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::from_io(e, path.clone()))?;
        file.write_all(content.as_bytes())
            .map_err(|e| StoreError::from_io(e, path.clone()))?;
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Keep the full file name so `Foo.md` and `Foo.txt` never share a temp file
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Remove everything under `root` except dot-prefixed entries
///
/// Editor state such as `.obsidian` survives. Returns the removed paths.
/// A missing root is not an error.
pub fn clean_output(root: &Path) -> StoreResult<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        return Err(StoreError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut removed = Vec::new();
    let entries = fs::read_dir(root).map_err(|e| StoreError::from_read(e, root.to_path_buf()))?;
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::from_read(e, root.to_path_buf()))?;
        let path = entry.path();

        if entry.file_name().to_string_lossy().starts_with('.') {
            debug!("Keeping {:?}", path);
            continue;
        }

        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| StoreError::from_io(e, path.clone()))?;
        info!("Removed {:?}", path);
        removed.push(path);
    }

    Ok(removed)
}
