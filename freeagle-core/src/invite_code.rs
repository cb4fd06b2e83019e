//! Composite invite codes of the form `<eventId>-<inviterUsername>`.
//!
//! The separator is not escaped, so an event id containing `-` decodes with
//! the wrong split. The format is kept as-is because the server parses codes
//! the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FreeagleError, FreeagleResult};

const SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteCode(String);

impl InviteCode {
    /// Build the code an inviter hands out for one of their events.
    pub fn encode(event_id: &str, inviter: &str) -> FreeagleResult<Self> {
        if event_id.is_empty() {
            return Err(FreeagleError::InvalidComponent("event id"));
        }
        if inviter.is_empty() {
            return Err(FreeagleError::InvalidComponent("inviter username"));
        }
        Ok(InviteCode(format!("{event_id}{SEPARATOR}{inviter}")))
    }

    /// Split into `(event_id, inviter)` on the first separator.
    pub fn decode(&self) -> FreeagleResult<(&str, &str)> {
        self.0
            .split_once(SEPARATOR)
            .ok_or_else(|| FreeagleError::MalformedInviteCode(self.0.clone()))
    }

    /// Parse user input into a code, rejecting anything that won't decode.
    pub fn parse(s: &str) -> FreeagleResult<Self> {
        let code = InviteCode(s.trim().to_string());
        code.decode()?;
        Ok(code)
    }

    pub fn event_id(&self) -> FreeagleResult<&str> {
        self.decode().map(|(event_id, _)| event_id)
    }

    pub fn inviter(&self) -> FreeagleResult<&str> {
        self.decode().map(|(_, inviter)| inviter)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
