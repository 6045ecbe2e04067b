//! Per-attempt verification state machine

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use tokio::sync::mpsc;
use tracing;
use uuid::Uuid;

use crate::domain::entities::ContactTarget;
use crate::domain::value_objects::AcceptedNumberTypes;
use crate::errors::{ChannelKind, DomainError, DomainResult};
use crate::services::region::RegionResolver;

use super::code::CodeGenerator;
use super::dispatcher::ChannelDispatcher;
use super::hooks::HookRunner;
use super::types::{Completion, SessionFailure, SessionSnapshot, SessionState, SubmitOutcome};

/// Collaborators shared by every session a service starts
pub(crate) struct SessionContext {
    pub(crate) dispatcher: ChannelDispatcher,
    pub(crate) hooks: HookRunner,
    pub(crate) regions: Arc<RegionResolver>,
    pub(crate) generator: Arc<dyn CodeGenerator>,
}

struct Inner {
    state: SessionState,
    code: String,
    /// Bumped on every send; only the latest send may move the state
    generation: u64,
    sends: u32,
    code_issued_at: Option<DateTime<Utc>>,
    last_failure: Option<SessionFailure>,
    /// Dropped once the session is confirmed or cancelled
    completion: Option<mpsc::UnboundedSender<DomainResult<ContactTarget>>>,
}

impl Inner {
    fn issue_code(&mut self, code: String) -> (u64, String) {
        self.generation += 1;
        self.sends += 1;
        self.code = code;
        self.code_issued_at = Some(Utc::now());
        (self.generation, self.code.clone())
    }
}

/// One in-flight verification of a contact point
///
/// Methods take `&self`, so a confirmation attempt may run while a resend
/// is still in flight. The internal lock is never held across an await.
pub struct VerificationSession {
    id: Uuid,
    target: ContactTarget,
    accepted_number_types: AcceptedNumberTypes,
    code_length: usize,
    created_at: DateTime<Utc>,
    context: Arc<SessionContext>,
    inner: Mutex<Inner>,
}

impl VerificationSession {
    pub(crate) fn new(
        context: Arc<SessionContext>,
        target: ContactTarget,
        accepted_number_types: AcceptedNumberTypes,
        code_length: usize,
    ) -> (Self, Completion) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let session = Self {
            id: Uuid::new_v4(),
            target,
            accepted_number_types,
            code_length,
            created_at: Utc::now(),
            context,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                code: String::new(),
                generation: 0,
                sends: 0,
                code_issued_at: None,
                last_failure: None,
                completion: Some(sender),
            }),
        };

        tracing::debug!(
            session_id = %session.id,
            contact = %session.target.masked(),
            event = "session_created",
            "Verification session created"
        );

        (session, Completion::new(receiver))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &ContactTarget {
        &self.target
    }

    pub fn accepted_number_types(&self) -> &AcceptedNumberTypes {
        &self.accepted_number_types
    }

    pub fn code_length(&self) -> usize {
        self.code_length
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// The most recent send failure, if any
    pub fn last_failure(&self) -> Option<SessionFailure> {
        self.lock().last_failure.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            id: self.id,
            state: inner.state,
            target: self.target.clone(),
            created_at: self.created_at,
            code_issued_at: inner.code_issued_at,
            sends: inner.sends,
            last_failure: inner.last_failure.clone(),
        }
    }

    /// Send the first code
    ///
    /// Only valid from `Idle`; otherwise the current state is returned
    /// unchanged. A failure lands the session in `Failed` and is reported
    /// through the completion. There is no automatic retry.
    pub async fn begin(&self) -> SessionState {
        let (generation, code) = {
            let mut inner = self.lock();
            if inner.state != SessionState::Idle {
                return inner.state;
            }
            inner.state = SessionState::Sending;
            let code = self.context.generator.generate(self.code_length);
            inner.issue_code(code)
        };

        tracing::info!(
            session_id = %self.id,
            contact = %self.target.masked(),
            event = "verification_started",
            "Sending verification code"
        );

        let result = self.deliver(&code).await;
        self.settle(generation, result)
    }

    /// Send a fresh code
    ///
    /// Valid from `AwaitingCode` or `Failed`. The previous code stops
    /// matching immediately; the state only changes once this send
    /// completes, and only if no newer send started in the meantime.
    pub async fn resend(&self) -> SessionState {
        let (generation, code) = {
            let mut inner = self.lock();
            if !matches!(inner.state, SessionState::AwaitingCode | SessionState::Failed) {
                return inner.state;
            }
            let code = self.context.generator.generate(self.code_length);
            inner.issue_code(code)
        };

        tracing::info!(
            session_id = %self.id,
            contact = %self.target.masked(),
            generation = generation,
            event = "verification_resent",
            "Resending verification code"
        );

        let result = self.deliver(&code).await;
        self.settle(generation, result)
    }

    /// Check a code entered by the user
    ///
    /// Only compared while awaiting a code and only when the input has
    /// exactly the code's length. Comparison is constant-time.
    pub fn submit(&self, attempt: &str) -> SubmitOutcome {
        let completion = {
            let mut inner = self.lock();
            if inner.state != SessionState::AwaitingCode {
                return SubmitOutcome::NotAwaiting;
            }
            if attempt.chars().count() != self.code_length {
                return SubmitOutcome::Incomplete;
            }
            if !constant_time_eq(attempt.as_bytes(), inner.code.as_bytes()) {
                tracing::debug!(
                    session_id = %self.id,
                    event = "code_mismatch",
                    "Entered code does not match"
                );
                return SubmitOutcome::Mismatch;
            }
            inner.state = SessionState::Confirmed;
            inner.completion.take()
        };

        tracing::info!(
            session_id = %self.id,
            contact = %self.target.masked(),
            event = "verification_confirmed",
            "Verification code confirmed"
        );

        if let Some(sender) = completion {
            let _ = sender.send(Ok(self.target.clone()));
        }
        SubmitOutcome::Confirmed(self.target.clone())
    }

    /// Abandon the session
    ///
    /// Returns `false` if it had already reached a terminal state. The
    /// completion reports nothing further; a send already in flight is not
    /// recalled.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            return false;
        }
        inner.state = SessionState::Cancelled;
        inner.completion.take();

        tracing::info!(
            session_id = %self.id,
            event = "verification_cancelled",
            "Verification session cancelled"
        );
        true
    }

    /// Read the outstanding code out in a phone call
    ///
    /// Valid only while awaiting a code on a phone target. The code is not
    /// regenerated and the state does not change; errors go to the caller.
    pub async fn request_voice_call(&self) -> DomainResult<()> {
        let number = self.target.as_phone().ok_or_else(|| {
            DomainError::invalid_contact("voice calls need a phone number target")
        })?;

        let code = {
            let inner = self.lock();
            if inner.state != SessionState::AwaitingCode {
                return Err(DomainError::InvalidState {
                    operation: "request_voice_call",
                    state: inner.state.to_string(),
                });
            }
            inner.code.clone()
        };

        let destination = self.context.regions.canonical_form(number);
        self.context
            .dispatcher
            .place_voice_call(&destination, &code)
            .await
            .map(|_| ())
    }

    async fn deliver(&self, code: &str) -> DomainResult<ChannelKind> {
        self.context.hooks.approve(&self.target).await?;

        match &self.target {
            ContactTarget::Phone(number) => {
                let destination = self.context.regions.canonical_form(number);
                self.context
                    .dispatcher
                    .send_to_phone(&destination, code, &self.accepted_number_types)
                    .await
            }
            ContactTarget::Email(address) => {
                self.context.dispatcher.send_email(address, code).await
            }
        }
    }

    fn settle(&self, generation: u64, result: DomainResult<ChannelKind>) -> SessionState {
        let mut inner = self.lock();

        if generation != inner.generation || inner.state.is_terminal() {
            tracing::debug!(
                session_id = %self.id,
                generation = generation,
                current_generation = inner.generation,
                state = %inner.state,
                event = "stale_send_ignored",
                "Send finished after a newer send or a terminal state"
            );
            return inner.state;
        }

        match result {
            Ok(channel) => {
                inner.state = SessionState::AwaitingCode;
                inner.last_failure = None;
                tracing::info!(
                    session_id = %self.id,
                    channel = %channel,
                    event = "awaiting_code",
                    "Verification code delivered"
                );
            }
            Err(error) => {
                inner.state = SessionState::Failed;
                inner.last_failure = Some(SessionFailure::from_error(&error));
                tracing::warn!(
                    session_id = %self.id,
                    error = %error,
                    error_code = error.code(),
                    event = "verification_send_failed",
                    "Verification code could not be sent"
                );
                if let Some(sender) = &inner.completion {
                    let _ = sender.send(Err(error));
                }
            }
        }
        inner.state
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner is consistent at every unlock
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for VerificationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationSession")
            .field("id", &self.id)
            .field("contact", &self.target.masked())
            .field("state", &self.state())
            .finish()
    }
}
