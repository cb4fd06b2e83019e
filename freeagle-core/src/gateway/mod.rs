//! The remote event API, as seen by the core.
//!
//! [`EventGateway`] is the seam between local state and the server. The
//! engine only ever talks to it through this trait; [`HttpGateway`] is the
//! real implementation.

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use log::debug;

use crate::error::{FreeagleError, FreeagleResult};
use crate::event::{Event, User};
use crate::invite_code::InviteCode;

#[async_trait]
pub trait EventGateway: Send + Sync {
    async fn username_exists(&self, username: &str) -> FreeagleResult<bool>;

    async fn register_username(&self, username: &str) -> FreeagleResult<()>;

    /// Look up a user. `None` when the server doesn't know the name.
    async fn find_user(&self, username: &str) -> FreeagleResult<Option<User>>;

    /// Every public event.
    async fn list_events(&self) -> FreeagleResult<Vec<Event>>;

    /// Publish a newly shared event.
    async fn create_event(&self, event: &Event) -> FreeagleResult<()>;

    /// Record whether `username` takes part in the invited event.
    ///
    /// `Ok(false)` means the server answered but refused the confirmation;
    /// callers must check the flag.
    async fn confirm_participation(
        &self,
        code: &InviteCode,
        username: &str,
        accepted: bool,
    ) -> FreeagleResult<bool>;

    /// Claim a nickname. Returns whether it was already taken.
    ///
    /// This is a check followed by a registration; another client can claim
    /// the same name in between.
    async fn register_username_if_available(&self, username: &str) -> FreeagleResult<bool> {
        if self.username_exists(username).await? {
            debug!("Username '{}' is taken", username);
            return Ok(true);
        }
        self.register_username(username).await?;
        Ok(false)
    }

    /// Resolve an invite code to the live event, including its participants.
    async fn fetch_event_by_invite_code(&self, code: &InviteCode) -> FreeagleResult<Event> {
        let event_id = code.event_id()?;
        self.list_events()
            .await?
            .into_iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| FreeagleError::NotFound(format!("No event for invite code '{code}'")))
    }
}
