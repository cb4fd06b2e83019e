//! Event and user types as exchanged with the remote API.
//!
//! The server relays PredictHQ records, so most fields keep PredictHQ's
//! snake_case names. Only the fields the server adds itself (`inviteCode`,
//! `users`) are camelCase. Timestamps are local wall-clock times without an
//! offset, so they are kept as `NaiveDateTime`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::invite_code::InviteCode;

/// An event, either fetched from the public listing or joined locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Set once the event has been shared or joined on this device
    #[serde(rename = "inviteCode", default, skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<InviteCode>,
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category tag, also used by the app to pick a local image asset
    pub category: String,
    /// Venues and performers attached to the event
    #[serde(default)]
    pub entities: Vec<Entity>,
    pub start_local: NaiveDateTime,
    pub end_local: NaiveDateTime,
    /// `[longitude, latitude]`
    pub location: Coordinates,
    #[serde(default)]
    pub geo: Geo,
    /// Live participation list, only present on events resolved from the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

impl Event {
    /// Look up a participant by username in the live `users` list.
    pub fn participant(&self, username: &str) -> Option<&User> {
        self.users
            .as_ref()?
            .iter()
            .find(|u| u.username == username)
    }

    /// A copy of this event carrying the given invite code.
    pub fn with_invite_code(&self, code: InviteCode) -> Event {
        Event {
            invite_code: Some(code),
            ..self.clone()
        }
    }

    pub fn address(&self) -> &Address {
        &self.geo.address
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default)]
    pub address: Address,
}

/// A `[longitude, latitude]` pair, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl From<[f64; 2]> for Coordinates {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Coordinates {
            longitude,
            latitude,
        }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.longitude, c.latitude]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub country_code: String,
    /// Full one-line address as PredictHQ formats it
    #[serde(default)]
    pub formatted_address: String,
    #[serde(rename = "postCode", default, skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let formatted = self.formatted_address.trim();
        if !formatted.is_empty() {
            return write!(f, "{}", formatted);
        }

        let parts: Vec<&str> = [
            self.post_code.as_deref(),
            self.locality.as_deref(),
            self.region.as_deref(),
            Some(self.country_code.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// A participant as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Sent by the server as the string `"true"` or `"false"`
    #[serde(with = "string_bool", default)]
    pub participate: bool,
}

/// Serde adapter for the server's string-typed booleans.
pub(crate) mod string_bool {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| de::Error::custom(format!("expected \"true\" or \"false\", got {s:?}")))
    }

    /// Parse a wire boolean, tolerating surrounding whitespace and JSON quotes.
    pub fn parse(s: &str) -> Option<bool> {
        match s.trim().trim_matches('"') {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn format(value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }
}
