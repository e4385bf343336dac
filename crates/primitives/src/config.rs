//! Collection configuration
//!
//! A `CollectionConfig` can be built in code, parsed from a TOML string, or
//! read from a TOML file. Every field has a default, so an empty file is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use stowage_core::{StowageError, StowageResult};
use stowage_storage::directory::validate_index_file_name;
use stowage_storage::{StoreOptions, DEFAULT_INDEX_FILE_NAME};

/// Conventional config file name for a collection
pub const CONFIG_FILE_NAME: &str = "stowage.toml";

/// Per-collection settings.
///
/// # Example
///
/// ```toml
/// # Name of the reserved index file inside the collection directory
/// index_file_name = ".index"
///
/// # Delete the whole directory when the collection is disposed
/// clear_on_dispose = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Reserved index file name.
    #[serde(default = "default_index_file_name")]
    pub index_file_name: String,
    /// Delete the directory subtree on dispose.
    #[serde(default)]
    pub clear_on_dispose: bool,
    /// fsync data files, the index, and the directory on every write.
    #[serde(default)]
    pub sync_writes: bool,
    /// Delete orphan data files once when the collection is opened.
    #[serde(default)]
    pub sweep_orphans_on_open: bool,
}

fn default_index_file_name() -> String {
    DEFAULT_INDEX_FILE_NAME.to_string()
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            index_file_name: default_index_file_name(),
            clear_on_dispose: false,
            sync_writes: false,
            sweep_orphans_on_open: false,
        }
    }
}

impl CollectionConfig {
    /// Set the index file name
    pub fn with_index_file_name(mut self, name: impl Into<String>) -> Self {
        self.index_file_name = name.into();
        self
    }

    /// Set clear-on-dispose
    pub fn with_clear_on_dispose(mut self, clear: bool) -> Self {
        self.clear_on_dispose = clear;
        self
    }

    /// Set fsync-on-write
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Set orphan sweeping at open time
    pub fn with_sweep_orphans_on_open(mut self, sweep: bool) -> Self {
        self.sweep_orphans_on_open = sweep;
        self
    }

    /// Check the configuration for values the store cannot use.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the index file name is empty, `.`/`..`,
    /// or contains a path separator.
    pub fn validate(&self) -> StowageResult<()> {
        validate_index_file_name(&self.index_file_name)
    }

    /// Options for the underlying store
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            index_file_name: self.index_file_name.clone(),
            sync_writes: self.sync_writes,
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Stowage collection configuration
#
# Name of the reserved index file inside the collection directory.
index_file_name = ".index"

# Delete the whole collection directory when the collection is disposed.
clear_on_dispose = false

# fsync every data file, index rewrite, and directory change (default: false).
sync_writes = false

# Delete data files that no index entry references, once, at open time.
sweep_orphans_on_open = false
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the text is not valid TOML for this
    /// structure or fails validation.
    pub fn from_toml_str(content: &str) -> StowageResult<Self> {
        let config: CollectionConfig = toml::from_str(content).map_err(|e| {
            StowageError::invalid_argument(format!("Failed to parse collection config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> StowageResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StowageError::io(format!("reading config file '{}'", path.display()), e)
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            StowageError::InvalidArgument(msg) => {
                StowageError::invalid_argument(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> StowageResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StowageError::io(format!("writing default config '{}'", path.display()), e)
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StowageResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            StowageError::invalid_argument(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)
            .map_err(|e| StowageError::io(format!("writing config '{}'", path.display()), e))
    }
}
