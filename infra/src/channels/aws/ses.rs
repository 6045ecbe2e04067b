//! AWS SES email channel

use async_trait::async_trait;
use aws_sdk_ses::{
    error::DisplayErrorContext,
    types::{Body, Content, Destination, Message},
    Client as SesClient,
};
use tracing::info;

use vk_core::errors::ChannelError;
use vk_core::services::verification::{EmailChannel, EmailMessage};
use vk_shared::phone::mask_email_address;

use crate::InfrastructureError;

const PROVIDER: &str = "aws_ses";
const CHARSET: &str = "UTF-8";

fn utf8_content(data: &str) -> Result<Content, InfrastructureError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| InfrastructureError::Config(format!("Invalid SES content: {}", e)))
}

/// Email channel backed by SES `SendEmail`
pub struct SesEmailChannel {
    client: SesClient,
}

impl SesEmailChannel {
    pub fn new(client: SesClient) -> Self {
        Self { client }
    }

    fn build_message(message: &EmailMessage) -> Result<Message, InfrastructureError> {
        let html = message.html_body.as_deref().map(utf8_content).transpose()?;
        let text = message.text_body.as_deref().map(utf8_content).transpose()?;
        let body = Body::builder().set_html(html).set_text(text).build();

        Message::builder()
            .subject(utf8_content(&message.subject)?)
            .body(body)
            .build()
            .map_err(|e| InfrastructureError::Config(format!("Invalid SES message: {}", e)))
    }

    async fn send(&self, message: &EmailMessage) -> Result<String, InfrastructureError> {
        let content = Self::build_message(message)?;
        let response = self
            .client
            .send_email()
            .source(&message.from)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .message(content)
            .send()
            .await
            .map_err(|e| {
                let error_msg = DisplayErrorContext(&e).to_string();
                if error_msg.contains("MessageRejected") || error_msg.contains("InvalidParameterValue") {
                    InfrastructureError::InvalidDestination(error_msg)
                } else {
                    InfrastructureError::Provider {
                        provider: "AWS SES".to_string(),
                        message: error_msg,
                    }
                }
            })?;

        Ok(response.message_id().to_string())
    }
}

#[async_trait]
impl EmailChannel for SesEmailChannel {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ChannelError> {
        let message_id = self
            .send(message)
            .await
            .map_err(|e| e.into_channel_error(PROVIDER))?;

        info!(
            email = %mask_email_address(&message.to),
            message_id = %message_id,
            event = "email_sent",
            "Email sent successfully via AWS SES"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_keeps_both_bodies() {
        let message = EmailMessage {
            to: "jane@example.com".to_string(),
            from: "verify@acme.test".to_string(),
            subject: "Please verify your email".to_string(),
            html_body: Some("<b>1234</b>".to_string()),
            text_body: None,
        };

        let built = SesEmailChannel::build_message(&message).unwrap();
        assert_eq!(built.subject().data(), "Please verify your email");
        assert_eq!(built.subject().charset(), Some(CHARSET));
        assert_eq!(built.body().html().map(|c| c.data()), Some("<b>1234</b>"));
        assert!(built.body().text().is_none());
    }
}
