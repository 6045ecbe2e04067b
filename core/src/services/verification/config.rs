//! Configuration for the verification service

use vk_shared::AppConfig;

use crate::domain::value_objects::AcceptedNumberTypes;
use crate::errors::{DomainError, DomainResult};

use super::code::DEFAULT_CODE_LENGTH;
use super::templates::MessageTemplates;

/// Longest code the engine issues
pub const MAX_CODE_LENGTH: usize = 10;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Digits per confirmation code
    pub code_length: usize,
    /// Number categories accepted when a session does not override them
    pub accepted_number_types: AcceptedNumberTypes,
    /// Message templates for every channel
    pub templates: MessageTemplates,
    /// Sender address for verification emails
    pub from_email_address: Option<String>,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            accepted_number_types: AcceptedNumberTypes::all(),
            templates: MessageTemplates::default(),
            from_email_address: None,
        }
    }
}

impl VerificationServiceConfig {
    /// Build from the loaded application configuration
    pub fn from_app_config(config: &AppConfig) -> DomainResult<Self> {
        let messaging = &config.messaging;

        let templates = MessageTemplates {
            app_name: messaging.app_name.clone(),
            sms: messaging.sms_template.clone(),
            voice: messaging.voice_template.clone(),
            email_subject: messaging.email_subject.clone(),
            html_email: messaging.html_email_template.clone(),
            text_email: messaging.text_email_template.clone(),
        };

        let service_config = Self {
            code_length: messaging.code_length,
            accepted_number_types: AcceptedNumberTypes::parse(&messaging.accepted_number_types)?,
            templates,
            from_email_address: config.channels.from_email_address().map(str::to_string),
        };
        service_config.validate()?;
        Ok(service_config)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(DomainError::config(format!(
                "code length must be between 1 and {}, got {}",
                MAX_CODE_LENGTH, self.code_length
            )));
        }
        if self.accepted_number_types.is_empty() {
            return Err(DomainError::config(
                "at least one phone number type must be accepted",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PhoneNumberType;

    #[test]
    fn test_default_config() {
        let config = VerificationServiceConfig::default();
        assert_eq!(config.code_length, 4);
        assert!(config.accepted_number_types.is_unrestricted());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_app_config() {
        let mut app = AppConfig::default();
        app.messaging.app_name = "Acme".to_string();
        app.messaging.code_length = 6;
        app.messaging.accepted_number_types = vec!["mobile".to_string()];
        app.channels.from_email_address = Some(" verify@acme.test ".to_string());

        let config = VerificationServiceConfig::from_app_config(&app).unwrap();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.templates.app_name, "Acme");
        assert_eq!(
            config.accepted_number_types,
            AcceptedNumberTypes::only([PhoneNumberType::Mobile])
        );
        assert_eq!(config.from_email_address.as_deref(), Some("verify@acme.test"));
    }

    #[test]
    fn test_unknown_number_type_is_rejected() {
        let mut app = AppConfig::default();
        app.messaging.accepted_number_types = vec!["pager".to_string()];
        assert!(matches!(
            VerificationServiceConfig::from_app_config(&app),
            Err(DomainError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_accepted_set_is_rejected() {
        let config = VerificationServiceConfig {
            accepted_number_types: AcceptedNumberTypes::only(Vec::<PhoneNumberType>::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_code_length_bounds() {
        let config = VerificationServiceConfig {
            code_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VerificationServiceConfig {
            code_length: MAX_CODE_LENGTH + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
