//! Channel adapters implementing the engine's delivery ports
//!
//! - `mock`: in-process channels that log and record what they would send
//! - `aws` (feature `aws`): SNS, Lambda and SES backed channels

use phonenumber::Mode;

use crate::InfrastructureError;

pub mod mock;

#[cfg(feature = "aws")]
pub mod aws;

pub use mock::{MockEmailChannel, MockNumberTypeLookup, MockSmsChannel, MockVoiceChannel};

/// Check that a destination is a parseable E.164 number and normalize it
pub fn validate_e164(destination: &str) -> Result<String, InfrastructureError> {
    if !destination.starts_with('+') {
        return Err(InfrastructureError::InvalidDestination(
            "Phone number must be in E.164 format (e.g., +14155550100)".to_string(),
        ));
    }

    let parsed = phonenumber::parse(None, destination).map_err(|e| {
        InfrastructureError::InvalidDestination(format!("Invalid phone number format: {}", e))
    })?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}
