//! The local nickname, the only identity the app has.

use std::sync::Arc;

use log::{info, warn};

use crate::error::{FreeagleError, FreeagleResult};
use crate::gateway::EventGateway;
use crate::preferences::{Preferences, USERNAME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Registered on the server and stored locally
    Claimed,
    /// Someone already uses this name; nothing was stored
    AlreadyTaken,
}

pub struct Identity {
    prefs: Arc<dyn Preferences>,
}

impl Identity {
    pub fn new(prefs: Arc<dyn Preferences>) -> Self {
        Identity { prefs }
    }

    /// The stored nickname, if one has been claimed.
    pub fn current(&self) -> Option<String> {
        match self.prefs.get(USERNAME_KEY) {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .ok()
                .filter(|name| !name.is_empty()),
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read username: {}", e);
                None
            }
        }
    }

    pub fn require(&self) -> FreeagleResult<String> {
        self.current().ok_or(FreeagleError::NotLoggedIn)
    }

    /// Register `username` with the server and remember it on success.
    pub async fn claim(
        &self,
        gateway: &dyn EventGateway,
        username: &str,
    ) -> FreeagleResult<ClaimOutcome> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FreeagleError::EmptyUsername);
        }

        if gateway.register_username_if_available(username).await? {
            return Ok(ClaimOutcome::AlreadyTaken);
        }

        self.prefs.set(USERNAME_KEY, username.as_bytes())?;
        info!("Claimed username '{}'", username);
        Ok(ClaimOutcome::Claimed)
    }

    pub fn forget(&self) -> FreeagleResult<()> {
        self.prefs.remove(USERNAME_KEY)
    }
}
