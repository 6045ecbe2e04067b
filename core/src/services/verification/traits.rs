//! Ports for delivery channels and the pre-send validation hook

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::ContactTarget;
use crate::errors::{BoxError, ChannelError};

/// Trait for SMS gateway integration
#[async_trait]
pub trait SmsChannel: Send + Sync {
    /// Send `message` to a canonical E.164 destination
    async fn send_sms(&self, destination: &str, message: &str) -> Result<(), ChannelError>;
}

/// Trait for voice-call gateway integration
#[async_trait]
pub trait VoiceChannel: Send + Sync {
    /// Call a canonical E.164 destination and speak `spoken_message`
    async fn place_voice_call(
        &self,
        destination: &str,
        spoken_message: &str,
    ) -> Result<(), ChannelError>;
}

/// Trait for phone-number-type lookup services
#[async_trait]
pub trait NumberTypeLookup: Send + Sync {
    /// Category name of a canonical E.164 number, e.g. `"mobile"`
    ///
    /// `Ok(None)` means the service answered without a category.
    async fn lookup_number_type(&self, destination: &str) -> Result<Option<String>, ChannelError>;
}

/// An outgoing verification email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

/// Trait for transactional email integration
#[async_trait]
pub trait EmailChannel: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ChannelError>;
}

/// Caller-supplied check run before any send
///
/// `Ok(false)` declines the contact; `Err` aborts the attempt with the error.
#[async_trait]
pub trait ValidationHook: Send + Sync {
    async fn validate(&self, target: &ContactTarget) -> Result<bool, BoxError>;
}
