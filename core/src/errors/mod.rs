//! Domain-specific error types and error handling.

mod types;


pub use types::{BoxError, ChannelError, ChannelKind};

use thiserror::Error;

/// Core domain errors
///
/// Every per-attempt failure of a verification session is one of these and is
/// reported through the session completion.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed or blank phone number / email address
    #[error("Invalid contact: {message}")]
    InvalidContact { message: String },

    /// The validation hook declined the contact
    #[error("Contact rejected by validation hook")]
    ValidationRejected,

    /// The validation hook itself failed
    #[error("Validation hook failed: {source}")]
    ValidationFailed {
        #[source]
        source: BoxError,
    },

    /// A channel port reported a transport failure
    #[error("Delivery via {channel} failed: {source}")]
    DeliveryFailed {
        channel: ChannelKind,
        #[source]
        source: ChannelError,
    },

    /// Lookup succeeded but the number category is not accepted
    #[error("Phone number type '{number_type}' is not accepted")]
    IneligibleNumberType { number_type: String },

    /// Lookup succeeded without a recognisable number category
    #[error("Could not determine an eligible phone number type (lookup returned {reported:?})")]
    UndeterminedNumberType { reported: Option<String> },

    /// A required channel was never wired or configured
    #[error("Channel '{channel}' is not configured")]
    MisconfiguredChannel { channel: String },

    /// Operation not allowed in the session's current state
    #[error("Cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Invalid engine configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DomainError {
    /// Build an [`DomainError::InvalidContact`]
    pub fn invalid_contact(message: impl Into<String>) -> Self {
        DomainError::InvalidContact {
            message: message.into(),
        }
    }

    /// Build a [`DomainError::MisconfiguredChannel`]
    pub fn misconfigured(channel: impl Into<String>) -> Self {
        DomainError::MisconfiguredChannel {
            channel: channel.into(),
        }
    }

    /// Build a [`DomainError::Config`]
    pub fn config(message: impl Into<String>) -> Self {
        DomainError::Config {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidContact { .. } => "INVALID_CONTACT",
            DomainError::ValidationRejected => "VALIDATION_REJECTED",
            DomainError::ValidationFailed { .. } => "VALIDATION_FAILED",
            DomainError::DeliveryFailed { .. } => "DELIVERY_FAILED",
            DomainError::IneligibleNumberType { .. } => "INELIGIBLE_NUMBER_TYPE",
            DomainError::UndeterminedNumberType { .. } => "UNDETERMINED_NUMBER_TYPE",
            DomainError::MisconfiguredChannel { .. } => "MISCONFIGURED_CHANNEL",
            DomainError::InvalidState { .. } => "INVALID_STATE",
            DomainError::Config { .. } => "CONFIG_ERROR",
        }
    }
}

impl From<vk_shared::ConfigError> for DomainError {
    fn from(err: vk_shared::ConfigError) -> Self {
        DomainError::config(err.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
