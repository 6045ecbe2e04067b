//! Verification engine
//!
//! This module provides the complete verification code workflow:
//! - Code generation from the OS CSPRNG
//! - Pre-send validation hooks
//! - Channel dispatch with the accepted number type policy
//! - Per-attempt sessions that report send failures and confirm at most once

mod code;
mod config;
mod dispatcher;
mod hooks;
mod service;
mod session;
mod templates;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use code::{CodeGenerator, RandomCodeGenerator, DEFAULT_CODE_LENGTH};
pub use config::{VerificationServiceConfig, MAX_CODE_LENGTH};
pub use dispatcher::ChannelDispatcher;
pub use hooks::HookRunner;
pub use service::{VerificationService, VerificationServiceBuilder};
pub use session::VerificationSession;
pub use templates::{spell_digits, MessageTemplates, RenderedEmail};
pub use traits::{EmailChannel, EmailMessage, NumberTypeLookup, SmsChannel, ValidationHook, VoiceChannel};
pub use types::{Completion, SessionFailure, SessionSnapshot, SessionState, SubmitOutcome};
