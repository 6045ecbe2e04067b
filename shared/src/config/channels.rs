//! Delivery channel configuration
//!
//! Selects the provider behind the SMS, voice, lookup and email ports and
//! carries the identifiers each provider needs.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::utils::validation::not_blank;

/// Provider names accepted in `channels.provider`
pub const SUPPORTED_PROVIDERS: &[&str] = &["mock", "aws"];

/// Channel provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Channel provider ("mock" or "aws")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// AWS region hosting SNS, Lambda and SES
    #[serde(default = "default_aws_region")]
    pub aws_region: String,

    /// Sender ID displayed on the receiving device (up to 11 alphanumerics)
    #[serde(default = "default_sender_id")]
    pub sender_id: String,

    /// SMS type: "Transactional" or "Promotional"
    #[serde(default = "default_sms_type")]
    pub sms_type: String,

    /// Function that looks up the type of a phone number
    #[serde(default)]
    pub lookup_function: Option<String>,

    /// Function that places a phone call reading out the code
    #[serde(default)]
    pub phonecall_function: Option<String>,

    /// Verified sender address for verification emails
    #[serde(default)]
    pub from_email_address: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            aws_region: default_aws_region(),
            sender_id: default_sender_id(),
            sms_type: default_sms_type(),
            lookup_function: None,
            phonecall_function: None,
            from_email_address: None,
        }
    }
}

impl ChannelConfig {
    /// Check provider-independent settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "channels.provider must be one of {:?}, got '{}'",
                SUPPORTED_PROVIDERS, self.provider
            )));
        }

        if self.sms_type != "Transactional" && self.sms_type != "Promotional" {
            return Err(ConfigError::Invalid(
                "channels.sms_type must be either 'Transactional' or 'Promotional'".to_string(),
            ));
        }

        let sender_ok = !self.sender_id.is_empty()
            && self.sender_id.len() <= 11
            && self.sender_id.chars().all(|c| c.is_ascii_alphanumeric())
            && self.sender_id.chars().any(|c| c.is_ascii_alphabetic());
        if !sender_ok {
            return Err(ConfigError::Invalid(format!(
                "channels.sender_id must be 1-11 alphanumeric characters with at least one letter, got '{}'",
                self.sender_id
            )));
        }

        Ok(())
    }

    /// Lookup function name, treating blank values as unset
    pub fn lookup_function(&self) -> Option<&str> {
        non_blank(self.lookup_function.as_deref())
    }

    /// Phone call function name, treating blank values as unset
    pub fn phonecall_function(&self) -> Option<&str> {
        non_blank(self.phonecall_function.as_deref())
    }

    /// Sender email address, treating blank values as unset
    pub fn from_email_address(&self) -> Option<&str> {
        non_blank(self.from_email_address.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| not_blank(v))
}

fn default_provider() -> String {
    String::from("mock")
}

fn default_aws_region() -> String {
    String::from("us-east-1")
}

fn default_sender_id() -> String {
    String::from("Verify")
}

fn default_sms_type() -> String {
    String::from("Transactional")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_config_is_valid() {
        let config = ChannelConfig::default();
        assert_eq!(config.provider, "mock");
        assert_eq!(config.sender_id, "Verify");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ChannelConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("channels.provider"));
    }

    #[test]
    fn test_sms_type_validation() {
        let config = ChannelConfig {
            sms_type: "Bulk".to_string(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("'Transactional' or 'Promotional'"));
    }

    #[test]
    fn test_sender_id_validation() {
        for bad in ["", "123456", "TooLongSender1", "has space"] {
            let config = ChannelConfig {
                sender_id: bad.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "sender id {:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_blank_identifiers_are_unset() {
        let config = ChannelConfig {
            lookup_function: Some("  ".to_string()),
            phonecall_function: Some("callout".to_string()),
            ..Default::default()
        };
        assert_eq!(config.lookup_function(), None);
        assert_eq!(config.phonecall_function(), Some("callout"));
        assert_eq!(config.from_email_address(), None);
    }
}
