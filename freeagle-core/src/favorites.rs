//! Per-device favorite markers on event ids.
//!
//! Favorites are independent of membership and never reconciled with the
//! server.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use log::warn;

use crate::error::{FreeagleError, FreeagleResult};
use crate::preferences::{FAVORITE_EVENTS_KEY, Preferences};

pub struct FavoritesLedger {
    prefs: Arc<dyn Preferences>,
    // Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FavoritesLedger {
    pub fn new(prefs: Arc<dyn Preferences>) -> Self {
        FavoritesLedger {
            prefs,
            write_lock: Mutex::new(()),
        }
    }

    /// Flip the favorite flag for an event. Returns the new state.
    pub fn toggle(&self, event_id: &str) -> FreeagleResult<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut favorites = self.read();

        let now_favorite = if favorites.remove(event_id) {
            false
        } else {
            favorites.insert(event_id.to_string());
            true
        };

        self.write(&favorites)?;
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, event_id: &str) -> bool {
        self.read().contains(event_id)
    }

    /// All favorite ids, sorted.
    pub fn all(&self) -> Vec<String> {
        self.read().into_iter().collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn clear(&self) -> FreeagleResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.prefs.remove(FAVORITE_EVENTS_KEY)
    }

    fn read(&self) -> BTreeSet<String> {
        match self.prefs.get(FAVORITE_EVENTS_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Favorites are unreadable, treating as empty: {}", e);
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!("Could not read favorites: {}", e);
                BTreeSet::new()
            }
        }
    }

    fn write(&self, favorites: &BTreeSet<String>) -> FreeagleResult<()> {
        let bytes = serde_json::to_vec(favorites)
            .map_err(|e| FreeagleError::PersistenceFailure(e.to_string()))?;
        self.prefs.set(FAVORITE_EVENTS_KEY, &bytes)
    }
}
