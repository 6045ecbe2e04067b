//! Channel selection and invocation

use std::sync::Arc;

use tracing;

use vk_shared::utils::phone::{mask_email_address, mask_phone_number};

use crate::domain::value_objects::{AcceptedNumberTypes, PhoneNumberType};
use crate::errors::{ChannelKind, DomainError, DomainResult};

use super::templates::MessageTemplates;
use super::traits::{EmailChannel, EmailMessage, NumberTypeLookup, SmsChannel, VoiceChannel};

/// Routes codes to the configured channel ports
///
/// Each call is independent: dispatch never merges with or cancels a send
/// that is already in flight.
#[derive(Clone, Default)]
pub struct ChannelDispatcher {
    sms: Option<Arc<dyn SmsChannel>>,
    voice: Option<Arc<dyn VoiceChannel>>,
    lookup: Option<Arc<dyn NumberTypeLookup>>,
    email: Option<Arc<dyn EmailChannel>>,
    templates: MessageTemplates,
    from_email_address: Option<String>,
}

impl ChannelDispatcher {
    pub fn new(templates: MessageTemplates) -> Self {
        Self {
            templates,
            ..Default::default()
        }
    }

    pub fn with_sms(mut self, channel: Arc<dyn SmsChannel>) -> Self {
        self.sms = Some(channel);
        self
    }

    pub fn with_voice(mut self, channel: Arc<dyn VoiceChannel>) -> Self {
        self.voice = Some(channel);
        self
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn NumberTypeLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_email(mut self, channel: Arc<dyn EmailChannel>, from_address: impl Into<String>) -> Self {
        self.email = Some(channel);
        self.from_email_address = Some(from_address.into());
        self
    }

    pub fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    pub fn has_voice(&self) -> bool {
        self.voice.is_some()
    }

    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }

    pub fn templates(&self) -> &MessageTemplates {
        &self.templates
    }

    /// Deliver `code` by SMS, applying the accepted number type policy
    ///
    /// With every type accepted the SMS goes out directly. Otherwise the
    /// number type is looked up first and the SMS is only sent for an
    /// accepted type.
    pub async fn send_to_phone(
        &self,
        destination: &str,
        code: &str,
        accepted: &AcceptedNumberTypes,
    ) -> DomainResult<ChannelKind> {
        if !accepted.is_unrestricted() {
            let number_type = self.lookup_number_type(destination).await?;
            if !accepted.contains(number_type) {
                tracing::info!(
                    phone = %mask_phone_number(destination),
                    number_type = %number_type,
                    event = "number_type_ineligible",
                    "Phone number type is not accepted"
                );
                return Err(DomainError::IneligibleNumberType {
                    number_type: number_type.to_string(),
                });
            }
        }

        self.send_sms(destination, code).await?;
        Ok(ChannelKind::Sms)
    }

    async fn lookup_number_type(&self, destination: &str) -> DomainResult<PhoneNumberType> {
        let lookup = self
            .lookup
            .as_ref()
            .ok_or_else(|| DomainError::misconfigured(ChannelKind::NumberTypeLookup.as_str()))?;

        let reported = lookup
            .lookup_number_type(destination)
            .await
            .map_err(|source| {
                tracing::error!(
                    phone = %mask_phone_number(destination),
                    error = %source,
                    event = "number_type_lookup_failed",
                    "Phone number type lookup failed"
                );
                DomainError::DeliveryFailed {
                    channel: ChannelKind::NumberTypeLookup,
                    source,
                }
            })?;

        tracing::debug!(
            phone = %mask_phone_number(destination),
            reported = ?reported,
            event = "number_type_resolved",
            "Phone number type lookup answered"
        );

        let recognised = reported
            .as_deref()
            .and_then(|name| name.parse::<PhoneNumberType>().ok());
        match recognised {
            Some(number_type) => Ok(number_type),
            None => Err(DomainError::UndeterminedNumberType { reported }),
        }
    }

    async fn send_sms(&self, destination: &str, code: &str) -> DomainResult<()> {
        let sms = self
            .sms
            .as_ref()
            .ok_or_else(|| DomainError::misconfigured(ChannelKind::Sms.as_str()))?;

        let message = self.templates.render_sms(code);
        sms.send_sms(destination, &message).await.map_err(|source| {
            tracing::error!(
                phone = %mask_phone_number(destination),
                error = %source,
                event = "sms_send_failed",
                "Failed to send verification SMS"
            );
            DomainError::DeliveryFailed {
                channel: ChannelKind::Sms,
                source,
            }
        })?;

        tracing::info!(
            phone = %mask_phone_number(destination),
            event = "sms_sent",
            "Verification SMS sent"
        );
        Ok(())
    }

    /// Speak `code` to `destination` as separated digits
    pub async fn place_voice_call(&self, destination: &str, code: &str) -> DomainResult<ChannelKind> {
        let voice = self
            .voice
            .as_ref()
            .ok_or_else(|| DomainError::misconfigured(ChannelKind::VoiceCall.as_str()))?;

        let spoken = self.templates.render_voice(code);
        voice
            .place_voice_call(destination, &spoken)
            .await
            .map_err(|source| {
                tracing::error!(
                    phone = %mask_phone_number(destination),
                    error = %source,
                    event = "voice_call_failed",
                    "Failed to place verification call"
                );
                DomainError::DeliveryFailed {
                    channel: ChannelKind::VoiceCall,
                    source,
                }
            })?;

        tracing::info!(
            phone = %mask_phone_number(destination),
            event = "voice_call_placed",
            "Verification call placed"
        );
        Ok(ChannelKind::VoiceCall)
    }

    /// Email `code` to `address` in HTML and/or text form
    pub async fn send_email(&self, address: &str, code: &str) -> DomainResult<ChannelKind> {
        let (email, from) = match (&self.email, &self.from_email_address) {
            (Some(email), Some(from)) => (email, from),
            _ => return Err(DomainError::misconfigured(ChannelKind::Email.as_str())),
        };

        let rendered = self.templates.render_email(code);
        let message = EmailMessage {
            to: address.to_string(),
            from: from.clone(),
            subject: rendered.subject,
            html_body: rendered.html_body,
            text_body: rendered.text_body,
        };

        email.send_email(&message).await.map_err(|source| {
            tracing::error!(
                email = %mask_email_address(address),
                error = %source,
                event = "email_send_failed",
                "Failed to send verification email"
            );
            DomainError::DeliveryFailed {
                channel: ChannelKind::Email,
                source,
            }
        })?;

        tracing::info!(
            email = %mask_email_address(address),
            event = "email_sent",
            "Verification email sent"
        );
        Ok(ChannelKind::Email)
    }
}

impl std::fmt::Debug for ChannelDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelDispatcher")
            .field("sms", &self.sms.is_some())
            .field("voice", &self.voice.is_some())
            .field("lookup", &self.lookup.is_some())
            .field("email", &self.email.is_some())
            .field("from_email_address", &self.from_email_address)
            .finish()
    }
}
