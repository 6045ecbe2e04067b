//! Message content configuration
//!
//! Templates use `{code}` and `{app_name}` placeholders.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ConfigError;

/// Default SMS text
pub const DEFAULT_SMS_TEMPLATE: &str = "{code} is your {app_name} verification code.";

/// Default spoken message (TwiML read out by the phone call function)
pub const DEFAULT_VOICE_TEMPLATE: &str = "<Response><Say language=\"en-US\" voice=\"alice\" loop=\"2\">Your verification code for {app_name} is, {code}.</Say></Response>";

/// Default email subject
pub const DEFAULT_EMAIL_SUBJECT: &str = "Please verify your email";

/// Messaging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessagingConfig {
    /// The app name which appears in the messages
    #[serde(default)]
    pub app_name: String,

    /// Number of digits in a verification code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Accepted phone number types ("landline", "mobile", "voip")
    #[serde(default = "default_accepted_number_types")]
    pub accepted_number_types: Vec<String>,

    /// SMS text template
    #[serde(default = "default_sms_template")]
    pub sms_template: String,

    /// Spoken message template for the phone call channel
    #[serde(default = "default_voice_template")]
    pub voice_template: String,

    /// Email subject line
    #[serde(default = "default_email_subject")]
    pub email_subject: String,

    /// Inline HTML email template
    #[serde(default)]
    pub html_email_template: Option<String>,

    /// Inline plain-text email template
    #[serde(default)]
    pub text_email_template: Option<String>,

    /// File holding the HTML email template, read at load time
    #[serde(default)]
    pub html_email_template_file: Option<PathBuf>,

    /// File holding the plain-text email template, read at load time
    #[serde(default)]
    pub text_email_template_file: Option<PathBuf>,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            code_length: default_code_length(),
            accepted_number_types: default_accepted_number_types(),
            sms_template: default_sms_template(),
            voice_template: default_voice_template(),
            email_subject: default_email_subject(),
            html_email_template: None,
            text_email_template: None,
            html_email_template_file: None,
            text_email_template_file: None,
        }
    }
}

impl MessagingConfig {
    /// Read template files into the inline template fields.
    ///
    /// Inline templates win over files; a missing file is an error.
    pub fn resolve_template_files(&mut self) -> Result<(), ConfigError> {
        if self.html_email_template.is_none() {
            if let Some(path) = &self.html_email_template_file {
                self.html_email_template = Some(read_template(path)?);
            }
        }
        if self.text_email_template.is_none() {
            if let Some(path) = &self.text_email_template_file {
                self.text_email_template = Some(read_template(path)?);
            }
        }
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 || self.code_length > 10 {
            return Err(ConfigError::Invalid(format!(
                "messaging.code_length must be between 1 and 10, got {}",
                self.code_length
            )));
        }
        if !self.sms_template.contains("{code}") {
            return Err(ConfigError::Invalid(
                "messaging.sms_template must contain a {code} placeholder".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_template(path: &PathBuf) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("cannot read template {}: {}", path.display(), e))
    })
}

fn default_code_length() -> usize {
    4
}

fn default_accepted_number_types() -> Vec<String> {
    vec!["landline".to_string(), "mobile".to_string(), "voip".to_string()]
}

fn default_sms_template() -> String {
    DEFAULT_SMS_TEMPLATE.to_string()
}

fn default_voice_template() -> String {
    DEFAULT_VOICE_TEMPLATE.to_string()
}

fn default_email_subject() -> String {
    DEFAULT_EMAIL_SUBJECT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MessagingConfig::default();
        assert_eq!(config.code_length, 4);
        assert_eq!(config.accepted_number_types.len(), 3);
        assert_eq!(config.email_subject, "Please verify your email");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_code_length_bounds() {
        let mut config = MessagingConfig::default();
        config.code_length = 0;
        assert!(config.validate().is_err());
        config.code_length = 11;
        assert!(config.validate().is_err());
        config.code_length = 6;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sms_template_requires_code() {
        let config = MessagingConfig {
            sms_template: "Welcome to {app_name}".to_string(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("{code}"));
    }

    #[test]
    fn test_missing_template_file() {
        let mut config = MessagingConfig {
            text_email_template_file: Some(PathBuf::from("/nonexistent/template.txt")),
            ..Default::default()
        };
        assert!(config.resolve_template_files().is_err());
    }

    #[test]
    fn test_inline_template_wins_over_file() {
        let mut config = MessagingConfig {
            text_email_template: Some("Code: {code}".to_string()),
            text_email_template_file: Some(PathBuf::from("/nonexistent/template.txt")),
            ..Default::default()
        };
        assert!(config.resolve_template_files().is_ok());
        assert_eq!(config.text_email_template.as_deref(), Some("Code: {code}"));
    }
}
