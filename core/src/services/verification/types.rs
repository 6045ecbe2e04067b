//! Types for verification sessions and their outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::entities::ContactTarget;
use crate::errors::{DomainError, DomainResult};

/// Lifecycle of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, nothing sent yet
    Idle,
    /// First send in flight
    Sending,
    /// A code was delivered and confirmation attempts are accepted
    AwaitingCode,
    /// The user entered the right code
    Confirmed,
    /// The latest send failed; a resend may recover
    Failed,
    /// Abandoned by the caller
    Cancelled,
}

impl SessionState {
    /// Confirmed and Cancelled accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Confirmed | SessionState::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Sending => "sending",
            SessionState::AwaitingCode => "awaiting_code",
            SessionState::Confirmed => "confirmed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a confirmation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Code matched; the session is confirmed
    Confirmed(ContactTarget),
    /// Right length, wrong digits
    Mismatch,
    /// Length differs from the code length; not compared
    Incomplete,
    /// The session is not waiting for a code
    NotAwaiting,
}

impl SubmitOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmitOutcome::Confirmed(_))
    }
}

/// Last send failure recorded on a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFailure {
    /// Error kind, as in [`DomainError::code`]
    pub code: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl SessionFailure {
    pub fn from_error(error: &DomainError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            at: Utc::now(),
        }
    }
}

/// Read-only view of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub state: SessionState,
    pub target: ContactTarget,
    pub created_at: DateTime<Utc>,
    /// When the outstanding code was generated
    pub code_issued_at: Option<DateTime<Utc>>,
    /// Number of sends started, including resends
    pub sends: u32,
    pub last_failure: Option<SessionFailure>,
}

/// Receives what the session reports to its owner
///
/// Every failed send yields `Some(Err(_))`; a session recovered through
/// `resend` keeps reporting, and confirmation yields `Some(Ok(target))`
/// exactly once. `None` means nothing more will arrive: the session was
/// confirmed and drained, cancelled, or dropped.
#[derive(Debug)]
pub struct Completion {
    receiver: mpsc::UnboundedReceiver<DomainResult<ContactTarget>>,
}

impl Completion {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<DomainResult<ContactTarget>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next outcome
    pub async fn outcome(&mut self) -> Option<DomainResult<ContactTarget>> {
        self.receiver.recv().await
    }

    /// The next outcome if one is already queued
    pub fn try_outcome(&mut self) -> Option<DomainResult<ContactTarget>> {
        self.receiver.try_recv().ok()
    }
}
