//! Message rendering for each delivery channel

use vk_shared::config::messaging::{
    DEFAULT_EMAIL_SUBJECT, DEFAULT_SMS_TEMPLATE, DEFAULT_VOICE_TEMPLATE,
};

const CODE_PLACEHOLDER: &str = "{code}";
const APP_NAME_PLACEHOLDER: &str = "{app_name}";

/// Rendered email content for one code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

/// Message templates with `{code}` and `{app_name}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    pub app_name: String,
    pub sms: String,
    pub voice: String,
    pub email_subject: String,
    pub html_email: Option<String>,
    pub text_email: Option<String>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            sms: DEFAULT_SMS_TEMPLATE.to_string(),
            voice: DEFAULT_VOICE_TEMPLATE.to_string(),
            email_subject: DEFAULT_EMAIL_SUBJECT.to_string(),
            html_email: None,
            text_email: None,
        }
    }
}

impl MessageTemplates {
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// SMS text, e.g. `"4821 is your Acme verification code."`
    pub fn render_sms(&self, code: &str) -> String {
        self.sms
            .replace(APP_NAME_PLACEHOLDER, &self.app_name)
            .replace(CODE_PLACEHOLDER, code)
    }

    /// Spoken message with the digits read out one at a time
    ///
    /// The voice template is TwiML, so the app name is XML-escaped.
    pub fn render_voice(&self, code: &str) -> String {
        self.voice
            .replace(APP_NAME_PLACEHOLDER, &escape_xml(&self.app_name))
            .replace(CODE_PLACEHOLDER, &spell_digits(code))
    }

    /// Email subject and bodies
    ///
    /// The code fills the first `{code}` of each body. With no email
    /// template configured the text body is the SMS message.
    pub fn render_email(&self, code: &str) -> RenderedEmail {
        let fill = |template: &String| {
            template
                .replace(APP_NAME_PLACEHOLDER, &self.app_name)
                .replacen(CODE_PLACEHOLDER, code, 1)
        };

        let html_body = self.html_email.as_ref().map(fill);
        let text_body = match (&self.html_email, &self.text_email) {
            (_, Some(text)) => Some(fill(text)),
            (None, None) => Some(self.render_sms(code)),
            (Some(_), None) => None,
        };

        RenderedEmail {
            subject: self.email_subject.replace(APP_NAME_PLACEHOLDER, &self.app_name),
            html_body,
            text_body,
        }
    }
}

/// `"1234"` becomes `"1, 2, 3, 4"`
pub fn spell_digits(code: &str) -> String {
    code.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
