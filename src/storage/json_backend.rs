use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::debug;

use super::{PlannerSnapshot, SnapshotBackend, CURRENT_SCHEMA_VERSION};
use crate::config::{tmp_path, write_file};
use crate::core::utils::ensure_dir;
use crate::errors::{PlannerError, Result};

/// Single-file JSON store. Every successful write is flushed to disk before it becomes
/// visible; concurrent writers race with last-write-wins semantics.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: RwLock<PlannerSnapshot>,
}

impl JsonStore {
    /// Opens the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            load_snapshot_from_path(&path)?
        } else {
            PlannerSnapshot::default()
        };
        Ok(Self {
            path,
            data: RwLock::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotBackend for JsonStore {
    fn read<R>(&self, f: impl FnOnce(&PlannerSnapshot) -> R) -> Result<R> {
        let guard = self.data.read().map_err(|_| poisoned())?;
        Ok(f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut PlannerSnapshot) -> Result<R>) -> Result<R> {
        let mut guard = self.data.write().map_err(|_| poisoned())?;
        let mut staged = guard.clone();
        let result = f(&mut staged)?;
        save_snapshot_to_path(&staged, &self.path)?;
        *guard = staged;
        Ok(result)
    }
}

/// Writes the snapshot atomically by staging to a temporary file.
pub fn save_snapshot_to_path(snapshot: &PlannerSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "planner data saved");
    Ok(())
}

pub fn load_snapshot_from_path(path: &Path) -> Result<PlannerSnapshot> {
    let data = fs::read_to_string(path)?;
    let snapshot: PlannerSnapshot = serde_json::from_str(&data)?;
    if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(PlannerError::PersistenceFailure(format!(
            "`{}` was written by a newer schema version",
            path.display()
        )));
    }
    Ok(snapshot)
}

fn poisoned() -> PlannerError {
    PlannerError::PersistenceFailure("store lock poisoned".into())
}
