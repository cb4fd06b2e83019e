//! Error types for the Freeagle core.

use thiserror::Error;

/// Why a request to the remote API did not produce a usable answer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Unexpected response: {0}")]
    Protocol(String),
}

/// Errors that can occur in Freeagle operations.
#[derive(Error, Debug)]
pub enum FreeagleError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Reconciliation failed: {0}")]
    ReconciliationFailed(TransportError),

    #[error("Remote rejected: {0}")]
    RemoteRejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed invite code: '{0}'")]
    MalformedInviteCode(String),

    #[error("Invite code '{code}' does not address event '{event_id}'")]
    EventMismatch { code: String, event_id: String },

    #[error("Invalid invite code component: {0} is empty")]
    InvalidComponent(&'static str),

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("No username set, run `freeagle login <name>` first")]
    NotLoggedIn,

    #[error("Event '{0}' has no invite code")]
    MissingInviteCode(String),

    #[error("Persistence error: {0}")]
    PersistenceFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FreeagleError {
    /// Re-tag a transport failure as a failed reconciliation. Other errors pass through.
    pub(crate) fn into_reconciliation(self) -> Self {
        match self {
            FreeagleError::Transport(e) => FreeagleError::ReconciliationFailed(e),
            other => other,
        }
    }
}

/// Result type alias for Freeagle operations.
pub type FreeagleResult<T> = Result<T, FreeagleError>;
