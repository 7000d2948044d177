//! Snapshot persistence.
//!
//! The engine saves and loads whole snapshots through the `Persistence`
//! trait at lifecycle boundaries only (suspend, cold start). It never depends
//! on persistence succeeding.

use parking_lot::Mutex;
use roster_core::{Error, Record, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Save/load collaborator for whole collection snapshots.
pub trait Persistence: Send + Sync {
    /// Stores a snapshot, replacing any earlier one.
    fn save(&self, records: &[Record]) -> Result<()>;

    /// Loads the last stored snapshot, or `None` if nothing was stored.
    fn load(&self) -> Result<Option<Vec<Record>>>;
}

/// Keeps the snapshot in memory. Useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    snapshot: Mutex<Option<Vec<Record>>>,
}

impl MemoryPersistence {
    /// Creates an empty persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a persistence that already holds a snapshot.
    pub fn with_snapshot(records: Vec<Record>) -> Self {
        Self {
            snapshot: Mutex::new(Some(records)),
        }
    }

    /// Returns a copy of the stored snapshot.
    pub fn stored(&self) -> Option<Vec<Record>> {
        self.snapshot.lock().clone()
    }
}

impl Persistence for MemoryPersistence {
    fn save(&self, records: &[Record]) -> Result<()> {
        *self.snapshot.lock() = Some(records.to_vec());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<Record>>> {
        Ok(self.snapshot.lock().clone())
    }
}

/// Stores the snapshot as a JSON array in a single file.
///
/// Saves write a sibling temporary file first and rename it over the target.
#[derive(Clone, Debug)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Creates a persistence backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Deletes the stored snapshot, if any.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl Persistence for JsonFilePersistence {
    fn save(&self, records: &[Record]) -> Result<()> {
        let encoded = serde_json::to_vec(records)?;
        let temp = self.temp_path();
        fs::write(&temp, encoded)?;
        fs::rename(&temp, &self.path)?;
        debug!(path = %self.path.display(), count = records.len(), "snapshot saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<Record>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::from(err)),
        };
        let records: Vec<Record> = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), count = records.len(), "snapshot loaded");
        Ok(Some(records))
    }
}
