//! Core of the Freeagle event client.
//!
//! This crate turns shareable invite codes into locally persisted event
//! memberships and keeps them in line with the event server:
//! - `invite_code` encodes and decodes `<eventId>-<inviter>` codes
//! - `membership` and `favorites` hold device-local state
//! - `gateway` talks to the server
//! - `reconcile` answers and shares invites

pub mod config;
pub mod error;
pub mod event;
pub mod favorites;
pub mod gateway;
pub mod identity;
pub mod invite_code;
pub mod membership;
pub mod preferences;
pub mod reconcile;

pub use error::{FreeagleError, FreeagleResult, TransportError};
pub use event::{Address, Coordinates, Entity, Event, Geo, User};
pub use invite_code::InviteCode;
