//! Events the local user has joined or shared, keyed by invite code.
//!
//! The whole collection is persisted as one JSON array under
//! [`USER_EVENTS_KEY`]. Mutations run under a single lock so a load/modify/save
//! cycle can't interleave with another one on the same store.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::error::{FreeagleError, FreeagleResult};
use crate::event::Event;
use crate::invite_code::InviteCode;
use crate::preferences::{Preferences, USER_EVENTS_KEY};

pub struct MembershipStore {
    prefs: Arc<dyn Preferences>,
    events: Mutex<Vec<Event>>,
}

impl MembershipStore {
    /// Open the store, reading whatever is persisted.
    ///
    /// Missing or unreadable state yields an empty store rather than an error.
    pub fn open(prefs: Arc<dyn Preferences>) -> Self {
        let events = read_persisted(prefs.as_ref());
        MembershipStore {
            prefs,
            events: Mutex::new(events),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All membership records, in insertion order.
    pub fn load_all(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Discard the in-memory view and re-read the persisted collection.
    pub fn reload(&self) {
        let events = read_persisted(self.prefs.as_ref());
        *self.lock() = events;
    }

    pub fn contains(&self, code: &InviteCode) -> bool {
        self.lock()
            .iter()
            .any(|e| e.invite_code.as_ref() == Some(code))
    }

    pub fn get(&self, code: &InviteCode) -> Option<Event> {
        self.lock()
            .iter()
            .find(|e| e.invite_code.as_ref() == Some(code))
            .cloned()
    }

    /// Insert a record unless one with the same invite code exists.
    ///
    /// Returns whether the record was added. An existing record is never
    /// overwritten. On a failed save the record stays in memory and
    /// `PersistenceFailure` is returned.
    pub fn upsert(&self, event: Event) -> FreeagleResult<bool> {
        let code = event
            .invite_code
            .clone()
            .ok_or_else(|| FreeagleError::MissingInviteCode(event.id.clone()))?;

        let mut events = self.lock();
        if events.iter().any(|e| e.invite_code.as_ref() == Some(&code)) {
            debug!("Membership {} already recorded, keeping existing", code);
            return Ok(false);
        }

        events.push(event);
        info!("Recorded membership {}", code);
        self.save(&events)?;
        Ok(true)
    }

    /// Remove every record with this invite code. Returns how many were removed.
    pub fn remove(&self, code: &InviteCode) -> FreeagleResult<usize> {
        let mut events = self.lock();
        let before = events.len();
        events.retain(|e| e.invite_code.as_ref() != Some(code));
        let removed = before - events.len();

        if removed == 0 {
            debug!("No membership {} to remove", code);
            return Ok(0);
        }

        info!("Removed membership {}", code);
        self.save(&events)?;
        Ok(removed)
    }

    fn save(&self, events: &[Event]) -> FreeagleResult<()> {
        let result = serde_json::to_vec(events)
            .map_err(|e| FreeagleError::PersistenceFailure(e.to_string()))
            .and_then(|bytes| self.prefs.set(USER_EVENTS_KEY, &bytes));

        if let Err(e) = &result {
            warn!("Could not persist joined events, keeping them in memory: {}", e);
        }
        result
    }
}

fn read_persisted(prefs: &dyn Preferences) -> Vec<Event> {
    let bytes = match prefs.get(USER_EVENTS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Could not read joined events, starting empty: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_slice::<Vec<Event>>(&bytes) {
        Ok(events) => {
            debug!("Loaded {} joined events", events.len());
            events
        }
        Err(e) => {
            warn!("Joined events are unreadable, starting empty: {}", e);
            Vec::new()
        }
    }
}
