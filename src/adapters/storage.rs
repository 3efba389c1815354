//! Local application-state snapshot
//!
//! The whole [`AppState`] is stored as one JSON document in
//! `<dir>/<key>.json`. Loading never fails: a missing or unreadable snapshot
//! yields `None`. Saving never raises: failures are logged and reported as
//! `false`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::domain::AppState;

pub const DEFAULT_STORAGE_KEY: &str = "gauntletfuse_state";

/// File-backed key-value slot holding the application state
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; `None` when absent or unparseable
    pub fn load(&self) -> Option<AppState> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No saved state at {}", self.path.display());
                return None;
            }
            Err(e) => {
                error!("Failed to read state from {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => {
                info!("Loaded state from {}", self.path.display());
                Some(state)
            }
            Err(e) => {
                warn!("Ignoring unparseable state at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Write the snapshot atomically. Returns false (after logging) on failure.
    pub fn save(&self, state: &AppState) -> bool {
        match self.write(state) {
            Ok(()) => {
                debug!("Saved state to {}", self.path.display());
                true
            }
            Err(e) => {
                error!("Failed to save state to {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Remove the snapshot. Returns true when a file was deleted.
    pub fn clear(&self) -> bool {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared state at {}", self.path.display());
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                error!("Failed to clear state at {}: {}", self.path.display(), e);
                false
            }
        }
    }

    fn write(&self, state: &AppState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(state).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}
