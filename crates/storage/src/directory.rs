//! Storage directory: one file per entry
//!
//! A collection directory holds N data files, each named by an `EntryKey`
//! and containing exactly the raw payload bytes, plus one reserved index
//! file (and its temporary sibling used during atomic rewrites).
//!
//! ```text
//! queue/
//! ├── .index                             # "<key> <order>" per line
//! ├── .index.tmp                         # only present mid-rewrite
//! ├── 3f0c9d1e6a7b4c2d9e8f1a2b3c4d5e6f   # payload bytes
//! └── ...
//! ```
//!
//! Every method has a blocking variant (std::fs) and an `_async` variant
//! (tokio::fs) that suspends at each file call.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use stowage_core::{EntryKey, StowageError, StowageResult};
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

/// Default name of the reserved index file
pub const DEFAULT_INDEX_FILE_NAME: &str = ".index";

/// Suffix of the temporary file an index rewrite goes through
pub const TEMP_SUFFIX: &str = ".tmp";

/// Check that `name` is usable as an index file name inside the directory.
pub fn validate_index_file_name(name: &str) -> StowageResult<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(StowageError::invalid_argument(format!(
            "index file name {:?} is not a valid file name",
            name
        )));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(StowageError::invalid_argument(format!(
            "index file name {:?} must not contain a path separator",
            name
        )));
    }
    Ok(())
}

/// Maps entry keys to payload files inside one directory.
#[derive(Debug, Clone)]
pub struct StorageDirectory {
    root: PathBuf,
    index_file_name: String,
    temp_file_name: String,
    sync_writes: bool,
}

impl StorageDirectory {
    /// Bind to `root`, creating it if absent.
    pub fn open(
        root: impl AsRef<Path>,
        index_file_name: &str,
        sync_writes: bool,
    ) -> StowageResult<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(StowageError::invalid_argument("directory path is empty"));
        }
        validate_index_file_name(index_file_name)?;

        fs::create_dir_all(root).map_err(|e| {
            StowageError::io(format!("creating directory {}", root.display()), e)
        })?;

        Ok(StorageDirectory {
            root: root.to_path_buf(),
            index_file_name: index_file_name.to_string(),
            temp_file_name: format!("{}{}", index_file_name, TEMP_SUFFIX),
            sync_writes,
        })
    }

    /// Root directory of the collection
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether writes are fsynced
    pub fn sync_writes(&self) -> bool {
        self.sync_writes
    }

    /// Path of the reserved index file
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file_name)
    }

    /// Path of the temporary file used while rewriting the index
    pub fn index_temp_path(&self) -> PathBuf {
        self.root.join(&self.temp_file_name)
    }

    /// True if `name` is one of the reserved (non-data) file names
    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.index_file_name || name == self.temp_file_name
    }

    /// Path of the data file backing `key`
    pub fn data_path(&self, key: &EntryKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    // ========================================================================
    // Blocking I/O
    // ========================================================================

    /// Read the payload for `key`.
    ///
    /// A missing file is reported as `NotFound`.
    pub fn read(&self, key: &EntryKey) -> StowageResult<Vec<u8>> {
        fs::read(self.data_path(key)).map_err(|e| read_error(key, e))
    }

    /// Create the data file for a new key.
    ///
    /// Fails if the file already exists. The returned guard deletes the file
    /// again unless [`PendingFile::commit`] is called.
    pub fn write_new(&self, key: &EntryKey, payload: &[u8]) -> StowageResult<PendingFile> {
        let path = self.data_path(key);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StowageError::io(format!("creating data file {}", key), e))?;
        // Armed before the first byte lands so a failed write is rolled back
        let pending = PendingFile::new(path);

        file.write_all(payload)
            .map_err(|e| StowageError::io(format!("writing data file {}", key), e))?;
        if self.sync_writes {
            file.sync_all()
                .map_err(|e| StowageError::io(format!("syncing data file {}", key), e))?;
        }
        Ok(pending)
    }

    /// Replace the payload of an existing key in place.
    pub fn overwrite(&self, key: &EntryKey, payload: &[u8]) -> StowageResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.data_path(key))
            .map_err(|e| read_error(key, e))?;
        file.write_all(payload)
            .map_err(|e| StowageError::io(format!("overwriting data file {}", key), e))?;
        if self.sync_writes {
            file.sync_all()
                .map_err(|e| StowageError::io(format!("syncing data file {}", key), e))?;
        }
        Ok(())
    }

    /// Delete the data file for `key`. Returns false if it was already gone.
    pub fn delete(&self, key: &EntryKey) -> StowageResult<bool> {
        self.delete_name(key.as_str())
    }

    /// Delete a data file by raw file name (used for orphan sweeps).
    pub fn delete_name(&self, name: &str) -> StowageResult<bool> {
        match fs::remove_file(self.root.join(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StowageError::io(format!("deleting data file {}", name), e)),
        }
    }

    /// True if a data file exists for `key`
    pub fn exists(&self, key: &EntryKey) -> bool {
        fs::metadata(self.data_path(key))
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Byte size of the payload stored under `key`
    pub fn size(&self, key: &EntryKey) -> StowageResult<u64> {
        fs::metadata(self.data_path(key))
            .map(|m| m.len())
            .map_err(|e| read_error(key, e))
    }

    /// Names of every data file, excluding the reserved index files.
    pub fn enumerate_files(&self) -> StowageResult<BTreeSet<String>> {
        let context = || format!("listing directory {}", self.root.display());
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.root).map_err(|e| StowageError::io(context(), e))? {
            let entry = entry.map_err(|e| StowageError::io(context(), e))?;
            let file_type = entry.file_type().map_err(|e| StowageError::io(context(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = self.data_file_name(entry.file_name()) {
                names.insert(name);
            }
        }
        Ok(names)
    }

    /// fsync the directory itself so renames and unlinks are durable.
    pub fn sync_dir(&self) -> StowageResult<()> {
        if !self.sync_writes {
            return Ok(());
        }
        sync_directory(&self.root)
    }

    /// Delete the whole directory subtree.
    pub fn remove_all(&self) -> StowageResult<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StowageError::io(
                format!("removing directory {}", self.root.display()),
                e,
            )),
        }
    }

    // ========================================================================
    // Async I/O
    // ========================================================================

    /// Async variant of [`read`](Self::read)
    pub async fn read_async(&self, key: &EntryKey) -> StowageResult<Vec<u8>> {
        tokio::fs::read(self.data_path(key))
            .await
            .map_err(|e| read_error(key, e))
    }

    /// Async variant of [`write_new`](Self::write_new).
    ///
    /// The write runs on the blocking pool and the guard is the task's
    /// output. If this future is dropped mid-write, tokio drops that output
    /// when the task finishes, which removes the file.
    pub async fn write_new_async(
        &self,
        key: &EntryKey,
        payload: &[u8],
    ) -> StowageResult<PendingFile> {
        let dir = self.clone();
        let key = key.clone();
        let payload = payload.to_vec();
        tokio::task::spawn_blocking(move || dir.write_new(&key, &payload))
            .await
            .map_err(|e| StowageError::io("writing data file", io::Error::other(e)))?
    }

    /// Async variant of [`overwrite`](Self::overwrite)
    pub async fn overwrite_async(&self, key: &EntryKey, payload: &[u8]) -> StowageResult<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.data_path(key))
            .await
            .map_err(|e| read_error(key, e))?;
        file.write_all(payload)
            .await
            .map_err(|e| StowageError::io(format!("overwriting data file {}", key), e))?;
        if self.sync_writes {
            file.sync_all()
                .await
                .map_err(|e| StowageError::io(format!("syncing data file {}", key), e))?;
        } else {
            file.flush()
                .await
                .map_err(|e| StowageError::io(format!("flushing data file {}", key), e))?;
        }
        Ok(())
    }

    /// Async variant of [`delete`](Self::delete)
    pub async fn delete_async(&self, key: &EntryKey) -> StowageResult<bool> {
        self.delete_name_async(key.as_str()).await
    }

    /// Async variant of [`delete_name`](Self::delete_name)
    pub async fn delete_name_async(&self, name: &str) -> StowageResult<bool> {
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StowageError::io(format!("deleting data file {}", name), e)),
        }
    }

    /// Async variant of [`size`](Self::size)
    pub async fn size_async(&self, key: &EntryKey) -> StowageResult<u64> {
        tokio::fs::metadata(self.data_path(key))
            .await
            .map(|m| m.len())
            .map_err(|e| read_error(key, e))
    }

    /// Async variant of [`enumerate_files`](Self::enumerate_files)
    pub async fn enumerate_files_async(&self) -> StowageResult<BTreeSet<String>> {
        let context = || format!("listing directory {}", self.root.display());
        let mut names = BTreeSet::new();
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StowageError::io(context(), e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StowageError::io(context(), e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StowageError::io(context(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = self.data_file_name(entry.file_name()) {
                names.insert(name);
            }
        }
        Ok(names)
    }

    /// Async variant of [`sync_dir`](Self::sync_dir)
    pub async fn sync_dir_async(&self) -> StowageResult<()> {
        if !self.sync_writes {
            return Ok(());
        }
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || sync_directory(&root))
            .await
            .map_err(|e| StowageError::io("syncing directory", io::Error::other(e)))?
    }

    fn data_file_name(&self, raw: std::ffi::OsString) -> Option<String> {
        match raw.into_string() {
            Ok(name) if !self.is_reserved(&name) => Some(name),
            Ok(_) => None,
            Err(raw) => {
                warn!(
                    target: "stowage::storage",
                    name = ?raw,
                    "Skipping non UTF-8 file name in collection directory"
                );
                None
            }
        }
    }
}

fn read_error(key: &EntryKey, e: io::Error) -> StowageError {
    if e.kind() == io::ErrorKind::NotFound {
        StowageError::not_found(format!("data file for key {}", key))
    } else {
        StowageError::io(format!("reading data file {}", key), e)
    }
}

#[cfg(unix)]
fn sync_directory(path: &Path) -> StowageResult<()> {
    File::open(path)
        .and_then(|dir| dir.sync_all())
        .map_err(|e| StowageError::io(format!("syncing directory {}", path.display()), e))
}

#[cfg(not(unix))]
fn sync_directory(_path: &Path) -> StowageResult<()> {
    Ok(())
}

// ============================================================================
// Pending file guard
// ============================================================================

/// A freshly written data file that is not yet referenced by the index.
///
/// Dropping the guard deletes the file. This is how an insert that fails (or
/// is cancelled) after the payload was written but before the index rewrite
/// leaves no orphan behind.
#[derive(Debug)]
#[must_use = "dropping a PendingFile deletes the file"]
pub struct PendingFile {
    path: PathBuf,
    armed: bool,
}

impl PendingFile {
    fn new(path: PathBuf) -> Self {
        PendingFile { path, armed: true }
    }

    /// Path of the pending file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file: the index now references it.
    pub fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => error!(
                target: "stowage::storage",
                path = ?self.path,
                error = %e,
                "Failed to roll back uncommitted data file"
            ),
        }
    }
}
