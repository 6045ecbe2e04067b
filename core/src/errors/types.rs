//! Error types reported by delivery channel ports
//!
//! Channel adapters translate their transport failures into [`ChannelError`]
//! so the dispatcher can wrap them uniformly in `DomainError::DeliveryFailed`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error returned by caller-supplied validation hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The external channel an operation went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Sms,
    VoiceCall,
    NumberTypeLookup,
    Email,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Sms => "sms",
            ChannelKind::VoiceCall => "voice_call",
            ChannelKind::NumberTypeLookup => "number_type_lookup",
            ChannelKind::Email => "email",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failure from a channel port
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The provider refused the destination (bad number, unverified address)
    #[error("Destination rejected by {provider}: {message}")]
    InvalidDestination { provider: String, message: String },

    /// The provider rejected the request content
    #[error("Request rejected by {provider}: {message}")]
    Rejected { provider: String, message: String },

    /// The provider could not be reached or failed while processing
    #[error("Transport failure at {provider}: {message}")]
    Transport { provider: String, message: String },

    /// The provider answered with something the adapter could not interpret
    #[error("Unexpected response from {provider}: {message}")]
    UnexpectedResponse { provider: String, message: String },
}

impl ChannelError {
    /// Name of the provider that produced the error
    pub fn provider(&self) -> &str {
        match self {
            ChannelError::InvalidDestination { provider, .. }
            | ChannelError::Rejected { provider, .. }
            | ChannelError::Transport { provider, .. }
            | ChannelError::UnexpectedResponse { provider, .. } => provider,
        }
    }

    /// Shorthand for a transport failure
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ChannelError::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
