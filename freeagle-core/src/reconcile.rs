//! Invite reconciliation.
//!
//! Each (local user, invite code) pair moves from `Pending` to `Accepted` or
//! `Declined`. The server is asked first; the membership store only changes
//! after it confirmed. Sharing is the one exception: with
//! [`ShareOrder::LocalFirst`] the local record is written before the event is
//! published, and a failed publish leaves the two sides out of step.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::config::ShareOrder;
use crate::error::{FreeagleError, FreeagleResult};
use crate::event::Event;
use crate::gateway::EventGateway;
use crate::invite_code::InviteCode;
use crate::membership::MembershipStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteState {
    /// No local record and no answer from the server yet
    Pending,
    /// Joined: local record present, server confirmed participation
    Accepted,
    /// Server confirmed non-participation, no local record
    Declined,
}

/// Result of answering an invite.
#[derive(Debug)]
pub struct Reconciliation {
    pub state: InviteState,
    /// Whether the membership store changed
    pub changed: bool,
    /// Set when the change is in memory but could not be saved
    pub persist_warning: Option<String>,
}

/// Result of sharing an event.
#[derive(Debug)]
pub struct ShareOutcome {
    pub code: InviteCode,
    /// The event had been shared before; nothing was published
    pub already_shared: bool,
    pub persist_warning: Option<String>,
    /// Background publish, only with [`ShareOrder::LocalFirst`]. Dropping it
    /// does not cancel the request.
    pub publish: Option<JoinHandle<FreeagleResult<()>>>,
}

impl ShareOutcome {
    fn existing(code: InviteCode) -> Self {
        ShareOutcome {
            code,
            already_shared: true,
            persist_warning: None,
            publish: None,
        }
    }
}

/// An invite resolved against the server.
#[derive(Debug)]
pub struct OpenedInvite {
    pub code: InviteCode,
    pub inviter: String,
    pub event: Event,
    /// Whether the event is already in the local joined list
    pub joined: bool,
}

/// Participation as the server currently sees it.
#[derive(Debug)]
pub struct RemoteStatus {
    pub event: Event,
    pub state: InviteState,
    pub joined_locally: bool,
}

pub struct InviteEngine {
    gateway: Arc<dyn EventGateway>,
    memberships: Arc<MembershipStore>,
    share_order: ShareOrder,
    /// Codes with a remote-first publish in progress
    publishing: Mutex<HashSet<InviteCode>>,
}

/// Holds an invite code in [`InviteEngine::publishing`] until dropped.
struct PublishReservation<'a> {
    publishing: &'a Mutex<HashSet<InviteCode>>,
    code: InviteCode,
}

impl Drop for PublishReservation<'_> {
    fn drop(&mut self) {
        self.publishing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.code);
    }
}

impl InviteEngine {
    pub fn new(
        gateway: Arc<dyn EventGateway>,
        memberships: Arc<MembershipStore>,
        share_order: ShareOrder,
    ) -> Self {
        InviteEngine {
            gateway,
            memberships,
            share_order,
            publishing: Mutex::new(HashSet::new()),
        }
    }

    pub fn memberships(&self) -> &MembershipStore {
        &self.memberships
    }

    /// Resolve an invite code to its event without changing anything.
    pub async fn open(&self, code: &InviteCode) -> FreeagleResult<OpenedInvite> {
        let (_, inviter) = code.decode()?;
        let event = self.gateway.fetch_event_by_invite_code(code).await?;

        Ok(OpenedInvite {
            code: code.clone(),
            inviter: inviter.to_string(),
            event,
            joined: self.memberships.contains(code),
        })
    }

    /// Accept or decline an invite on behalf of `username`.
    ///
    /// The server is asked first. A transport failure is reported as
    /// `ReconciliationFailed` and a refusal as `RemoteRejected`; in both cases
    /// the membership store is left as it was. `event` must be the event the
    /// code addresses.
    pub async fn respond(
        &self,
        code: &InviteCode,
        username: &str,
        accept: bool,
        event: &Event,
    ) -> FreeagleResult<Reconciliation> {
        if username.is_empty() {
            return Err(FreeagleError::EmptyUsername);
        }
        let (event_id, _) = code.decode()?;
        if event.id != event_id {
            return Err(FreeagleError::EventMismatch {
                code: code.to_string(),
                event_id: event.id.clone(),
            });
        }

        let confirmed = self
            .gateway
            .confirm_participation(code, username, accept)
            .await
            .map_err(FreeagleError::into_reconciliation)?;

        if !confirmed {
            warn!("Server refused {} for {}", if accept { "accept" } else { "decline" }, code);
            return Err(FreeagleError::RemoteRejected(format!(
                "The server did not confirm your answer to '{code}'"
            )));
        }

        if accept {
            let result = self.memberships.upsert(event.with_invite_code(code.clone()));
            let (changed, persist_warning) = store_outcome(result)?;
            info!("Accepted invite {}", code);
            Ok(Reconciliation {
                state: InviteState::Accepted,
                changed,
                persist_warning,
            })
        } else {
            let result = self.memberships.remove(code);
            let (changed, persist_warning) = store_outcome(result.map(|removed| removed > 0))?;
            info!("Declined invite {}", code);
            Ok(Reconciliation {
                state: InviteState::Declined,
                changed,
                persist_warning,
            })
        }
    }

    /// Generate the invite code for one of `username`'s events and record it.
    ///
    /// Sharing an event that is already recorded, or that another call is
    /// still publishing, returns the same code with `already_shared` set and
    /// publishes nothing.
    pub async fn share(&self, event: &Event, username: &str) -> FreeagleResult<ShareOutcome> {
        if username.is_empty() {
            return Err(FreeagleError::EmptyUsername);
        }
        let code = InviteCode::encode(&event.id, username)?;
        let record = event.with_invite_code(code.clone());

        match self.share_order {
            ShareOrder::LocalFirst => {
                let (added, persist_warning) =
                    store_outcome(self.memberships.upsert(record.clone()))?;
                if !added {
                    debug!("Event {} already shared as {}", event.id, code);
                    return Ok(ShareOutcome::existing(code));
                }

                let publish = self.publish_in_background(record);
                info!("Shared {} (publishing in background)", code);
                Ok(ShareOutcome {
                    code,
                    already_shared: false,
                    persist_warning,
                    publish: Some(publish),
                })
            }
            ShareOrder::RemoteFirst => {
                let Some(_reservation) = self.reserve_publish(&code) else {
                    debug!("Event {} is already being shared as {}", event.id, code);
                    return Ok(ShareOutcome::existing(code));
                };
                // Checked after reserving, so a share that just finished is seen
                if self.memberships.contains(&code) {
                    debug!("Event {} already shared as {}", event.id, code);
                    return Ok(ShareOutcome::existing(code));
                }

                self.gateway.create_event(&record).await?;
                let (_, persist_warning) = store_outcome(self.memberships.upsert(record))?;
                info!("Shared {}", code);
                Ok(ShareOutcome {
                    code,
                    already_shared: false,
                    persist_warning,
                    publish: None,
                })
            }
        }
    }

    /// Claim `code` for a remote-first publish. `None` if another call holds it.
    fn reserve_publish(&self, code: &InviteCode) -> Option<PublishReservation<'_>> {
        let mut publishing = self.publishing.lock().unwrap_or_else(|e| e.into_inner());
        if !publishing.insert(code.clone()) {
            return None;
        }
        Some(PublishReservation {
            publishing: &self.publishing,
            code: code.clone(),
        })
    }

    fn publish_in_background(&self, record: Event) -> JoinHandle<FreeagleResult<()>> {
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            let result = gateway.create_event(&record).await;
            if let Err(e) = &result {
                warn!(
                    "Publishing {} failed, local record kept: {}",
                    record.id, e
                );
            }
            result
        })
    }

    /// Local view of an invite. Never contacts the server, so it can lag
    /// behind; use [`InviteEngine::refresh`] for the live answer.
    pub fn status(&self, code: &InviteCode) -> InviteState {
        if self.memberships.contains(code) {
            InviteState::Accepted
        } else {
            InviteState::Pending
        }
    }

    /// Ask the server how `username` currently stands on an invite.
    pub async fn refresh(&self, code: &InviteCode, username: &str) -> FreeagleResult<RemoteStatus> {
        let event = self.gateway.fetch_event_by_invite_code(code).await?;

        let state = match event.participant(username) {
            Some(user) if user.participate => InviteState::Accepted,
            Some(_) => InviteState::Declined,
            None => InviteState::Pending,
        };
        let joined_locally = self.memberships.contains(code);

        if joined_locally != (state == InviteState::Accepted) {
            debug!(
                "Invite {} is {:?} remotely but joined_locally={}",
                code, state, joined_locally
            );
        }

        Ok(RemoteStatus {
            event,
            state,
            joined_locally,
        })
    }

    pub fn joined_events(&self) -> Vec<Event> {
        self.memberships.load_all()
    }
}

/// Split a store result into (changed, warning). A failed save is a warning:
/// the change is in memory and will be written with the next save.
fn store_outcome(result: FreeagleResult<bool>) -> FreeagleResult<(bool, Option<String>)> {
    match result {
        Ok(changed) => Ok((changed, None)),
        Err(FreeagleError::PersistenceFailure(msg)) => Ok((true, Some(msg))),
        Err(e) => Err(e),
    }
}
