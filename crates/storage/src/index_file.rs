//! Index file persistence
//!
//! The index is always rewritten with write-fsync-rename: the new content is
//! written to `<index>.tmp`, optionally fsynced, then renamed over the index.
//! A crash mid-write leaves either the old or the new index, never a
//! truncated one.

use crate::index::{IndexMap, ParsedIndex};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use stowage_core::{StowageError, StowageResult};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Handle to the on-disk index file of one collection
#[derive(Debug, Clone)]
pub struct IndexFile {
    path: PathBuf,
    temp_path: PathBuf,
    sync_writes: bool,
}

impl IndexFile {
    /// Create a handle. Nothing is touched on disk.
    pub fn new(path: PathBuf, temp_path: PathBuf, sync_writes: bool) -> Self {
        IndexFile {
            path,
            temp_path,
            sync_writes,
        }
    }

    /// Path of the index file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty index file if none exists.
    pub fn ensure_exists(&self) -> StowageResult<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map(|_| ())
            .map_err(|e| StowageError::io(format!("creating index {}", self.path.display()), e))
    }

    /// Read and parse the index. A missing file is recreated empty.
    pub fn load(&self) -> StowageResult<ParsedIndex> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(IndexMap::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.ensure_exists()?;
                Ok(ParsedIndex::default())
            }
            Err(e) => Err(StowageError::io(
                format!("reading index {}", self.path.display()),
                e,
            )),
        }
    }

    /// Atomically replace the index with `map`.
    pub fn persist(&self, map: &IndexMap) -> StowageResult<()> {
        let content = map.render();
        let context = || format!("writing index {}", self.temp_path.display());

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| StowageError::io(context(), e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| StowageError::io(context(), e))?;
        if self.sync_writes {
            file.sync_all().map_err(|e| StowageError::io(context(), e))?;
        }
        drop(file);

        fs::rename(&self.temp_path, &self.path).map_err(|e| {
            StowageError::io(format!("replacing index {}", self.path.display()), e)
        })?;
        self.sync_parent()?;

        debug!(target: "stowage::index", entries = map.len(), "Index persisted");
        Ok(())
    }

    /// Async variant of [`load`](Self::load)
    pub async fn load_async(&self) -> StowageResult<ParsedIndex> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(IndexMap::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .await
                    .map_err(|e| {
                        StowageError::io(format!("creating index {}", self.path.display()), e)
                    })?;
                Ok(ParsedIndex::default())
            }
            Err(e) => Err(StowageError::io(
                format!("reading index {}", self.path.display()),
                e,
            )),
        }
    }

    /// Async variant of [`persist`](Self::persist)
    pub async fn persist_async(&self, map: &IndexMap) -> StowageResult<()> {
        let content = map.render();
        let context = || format!("writing index {}", self.temp_path.display());

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.temp_path)
            .await
            .map_err(|e| StowageError::io(context(), e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| StowageError::io(context(), e))?;
        if self.sync_writes {
            file.sync_all()
                .await
                .map_err(|e| StowageError::io(context(), e))?;
        } else {
            file.flush().await.map_err(|e| StowageError::io(context(), e))?;
        }
        drop(file);

        tokio::fs::rename(&self.temp_path, &self.path)
            .await
            .map_err(|e| {
                StowageError::io(format!("replacing index {}", self.path.display()), e)
            })?;
        if self.sync_writes {
            let path = self.path.clone();
            let index = self.clone();
            tokio::task::spawn_blocking(move || index.sync_parent())
                .await
                .map_err(|e| {
                    StowageError::io(
                        format!("syncing parent of {}", path.display()),
                        io::Error::other(e),
                    )
                })??;
        }

        debug!(target: "stowage::index", entries = map.len(), "Index persisted");
        Ok(())
    }

    fn sync_parent(&self) -> StowageResult<()> {
        if !self.sync_writes {
            return Ok(());
        }
        #[cfg(unix)]
        if let Some(parent) = self.path.parent() {
            File::open(parent)
                .and_then(|dir| dir.sync_all())
                .map_err(|e| {
                    StowageError::io(format!("syncing directory {}", parent.display()), e)
                })?;
        }
        Ok(())
    }
}
