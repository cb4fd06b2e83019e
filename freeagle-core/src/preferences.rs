//! Device-local key-value storage.
//!
//! Every persisted piece of state lives under one key of this namespace.
//! Values are raw bytes; callers decide on the encoding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{FreeagleError, FreeagleResult};

/// Nickname of the local user (plain UTF-8).
pub const USERNAME_KEY: &str = "username";
/// Joined events (JSON array of `Event`).
pub const USER_EVENTS_KEY: &str = "userEvents";
/// Favorite event ids (JSON array of strings).
pub const FAVORITE_EVENTS_KEY: &str = "favoriteEvents";

pub trait Preferences: Send + Sync {
    /// Read a key. `None` when nothing has been stored under it.
    fn get(&self, key: &str) -> FreeagleResult<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> FreeagleResult<()>;

    fn remove(&self, key: &str) -> FreeagleResult<()>;
}

/// Stores each key as a file inside a data directory.
pub struct FilePreferences {
    dir: PathBuf,
}

impl FilePreferences {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FilePreferences { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> FreeagleResult<Option<Vec<u8>>> {
        match std::fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FreeagleError::PersistenceFailure(format!(
                "Could not read '{key}': {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> FreeagleResult<()> {
        let write = || -> std::io::Result<()> {
            std::fs::create_dir_all(&self.dir)?;

            let path = self.path(key);
            let temp = self.dir.join(format!("{key}.tmp"));

            std::fs::write(&temp, value)?;
            std::fs::rename(&temp, &path)
        };

        write().map_err(|e| FreeagleError::PersistenceFailure(format!("Could not write '{key}': {e}")))
    }

    fn remove(&self, key: &str) -> FreeagleResult<()> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FreeagleError::PersistenceFailure(format!(
                "Could not remove '{key}': {e}"
            ))),
        }
    }
}

/// In-process storage, used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still a valid map
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> FreeagleResult<Option<Vec<u8>>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> FreeagleResult<()> {
        self.values().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> FreeagleResult<()> {
        self.values().remove(key);
        Ok(())
    }
}
