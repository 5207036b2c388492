//! File-backed persistence for the mount table.
//!
//! Reads are best effort: any failure to read or decode the file yields an
//! empty table and a log event, never an error for the caller. Writes encode
//! the whole table in memory first and then replace the file atomically, so
//! an encoding failure leaves the previous file byte-for-byte intact and a
//! crash mid-write never leaves a truncated file behind.
//!
//! One writer at a time is assumed. Two processes mutating concurrently are
//! not coordinated; the last rename wins.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::descriptor::MountDescriptor;
use crate::name::MountName;
use crate::table::MountTable;

/// Tracing target for store events.
pub const STORE_TARGET: &str = "xenon_mounts::store";

/// Reasons the backing file could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("mount file {path} does not exist")]
    Missing {
        /// Backing file path.
        path: Utf8PathBuf,
    },
    /// The file exists but could not be read.
    #[error("failed to read mount file {path}: {source}")]
    Read {
        /// Backing file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The contents are not a valid mount table.
    #[error("failed to decode mount file {path}: {source}")]
    Decode {
        /// Backing file path.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Reasons a table could not be persisted. The previous file is untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The table could not be serialised.
    #[error("failed to encode mount table: {0}")]
    Encode(#[source] serde_json::Error),
    /// The encoded table could not be written into place.
    #[error("failed to write mount file {path}: {source}")]
    Write {
        /// Backing file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// The mount table file at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountStore {
    path: Utf8PathBuf,
}

impl MountStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Reads and decodes the backing file, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing a missing, unreadable or
    /// undecodable file.
    pub fn try_load(&self) -> Result<MountTable, LoadError> {
        let contents = fs::read(self.path.as_std_path()).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LoadError::Missing {
                    path: self.path.clone(),
                }
            } else {
                LoadError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_slice(&contents).map_err(|source| LoadError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Current table; empty when the file is missing, unreadable or corrupt.
    #[must_use]
    pub fn load(&self) -> MountTable {
        match self.try_load() {
            Ok(table) => {
                debug!(
                    target: STORE_TARGET,
                    file = %self.path,
                    mounts = table.len(),
                    "loaded mount table"
                );
                table
            }
            Err(LoadError::Missing { .. }) => {
                debug!(target: STORE_TARGET, file = %self.path, "no mount table yet");
                MountTable::new()
            }
            Err(error) => {
                warn!(target: STORE_TARGET, %error, "using an empty mount table");
                MountTable::new()
            }
        }
    }

    /// Replaces the backing file with `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] when the table cannot be serialised and
    /// [`StoreError::Write`] when the file cannot be replaced. In both cases
    /// the existing file is left as it was.
    pub fn save(&self, table: &MountTable) -> Result<(), StoreError> {
        self.persist(serde_json::to_vec_pretty(table))
    }

    /// Loads, inserts or replaces `name`, and saves. Returns the replaced
    /// descriptor, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the updated table cannot be saved.
    pub fn upsert(
        &self,
        name: &MountName,
        descriptor: MountDescriptor,
    ) -> Result<Option<MountDescriptor>, StoreError> {
        let mut table = self.load();
        let previous = table.insert(name, descriptor);
        self.save(&table)?;
        info!(target: STORE_TARGET, mount = %name, replaced = previous.is_some(), "mount saved");
        Ok(previous)
    }

    /// Loads, removes `name`, and saves. Returns the removed descriptor; when
    /// the name is absent nothing is written.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the updated table cannot be saved.
    pub fn remove(&self, name: &str) -> Result<Option<MountDescriptor>, StoreError> {
        let mut table = self.load();
        let Some(removed) = table.remove(name) else {
            debug!(target: STORE_TARGET, mount = name, "nothing to remove");
            return Ok(None);
        };
        self.save(&table)?;
        info!(target: STORE_TARGET, mount = name, "mount removed");
        Ok(Some(removed))
    }

    fn persist(&self, encoded: Result<Vec<u8>, serde_json::Error>) -> Result<(), StoreError> {
        let bytes = encoded.map_err(StoreError::Encode)?;
        atomic_write(self.path.as_std_path(), &bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Writes `contents` beside `path` and renames it into place.
///
/// Data is flushed and fsync'd before the rename so readers never observe a
/// partially written table.
fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "mount file path did not have a parent directory",
            ));
        }
    };
    fs::create_dir_all(directory)?;

    let mut builder = Builder::new();
    builder.prefix(
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("mounts"),
    );
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        // The daemon reads this file under its own account.
        builder.permissions(Permissions::from_mode(0o644));
    }

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
