//! AWS SNS SMS Channel
//!
//! Publishes verification codes as SMS through SNS with the configured sender
//! id and SMS type. Throttling and service errors are retried with
//! exponential backoff; validation errors fail immediately.

use async_trait::async_trait;
use aws_sdk_sns::{error::DisplayErrorContext, types::MessageAttributeValue, Client as SnsClient};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use vk_core::errors::ChannelError;
use vk_core::services::verification::SmsChannel;
use vk_shared::phone::mask_phone_number;
use vk_shared::ChannelConfig;

use crate::channels::validate_e164;
use crate::InfrastructureError;

const PROVIDER: &str = "aws_sns";

/// SNS limit for a single SMS publish
const MAX_MESSAGE_LENGTH: usize = 1600;

/// AWS SNS SMS channel configuration
#[derive(Debug, Clone)]
pub struct AwsSnsConfig {
    /// Sender ID shown on the receiving device
    pub sender_id: String,
    /// SMS type: "Transactional" or "Promotional"
    pub sms_type: String,
    /// Maximum attempts per message
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
}

impl AwsSnsConfig {
    pub fn from_channel_config(config: &ChannelConfig) -> Self {
        Self {
            sender_id: config.sender_id.clone(),
            sms_type: config.sms_type.clone(),
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }

    fn sms_attributes(&self) -> Result<HashMap<String, MessageAttributeValue>, InfrastructureError> {
        let mut attributes = HashMap::new();
        attributes.insert(
            "AWS.SNS.SMS.SMSType".to_string(),
            string_attribute(&self.sms_type)?,
        );
        attributes.insert(
            "AWS.SNS.SMS.SenderID".to_string(),
            string_attribute(&self.sender_id)?,
        );
        Ok(attributes)
    }
}

fn string_attribute(value: &str) -> Result<MessageAttributeValue, InfrastructureError> {
    MessageAttributeValue::builder()
        .data_type("String")
        .string_value(value)
        .build()
        .map_err(|e| InfrastructureError::Config(format!("Invalid SNS message attribute: {}", e)))
}

/// Errors worth another attempt
fn is_retryable(error_msg: &str) -> bool {
    [
        "Throttl",
        "Rate exceeded",
        "ServiceUnavailable",
        "InternalError",
        "RequestTimeout",
        "dispatch failure",
        "timeout",
    ]
    .iter()
    .any(|marker| error_msg.contains(marker))
}

fn is_invalid_request(error_msg: &str) -> bool {
    ["InvalidParameter", "InvalidPhoneNumber", "ValidationError", "OptedOut"]
        .iter()
        .any(|marker| error_msg.contains(marker))
}

/// SMS channel backed by AWS SNS
pub struct SnsSmsChannel {
    client: SnsClient,
    config: AwsSnsConfig,
}

impl SnsSmsChannel {
    pub fn new(client: SnsClient, config: AwsSnsConfig) -> Self {
        info!(
            sender_id = %config.sender_id,
            sms_type = %config.sms_type,
            event = "sns_channel_ready",
            "AWS SNS SMS channel initialized"
        );
        Self { client, config }
    }

    async fn send_with_retry(&self, to: &str, message: &str) -> Result<String, InfrastructureError> {
        let attributes = self.config.sms_attributes()?;
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                attempt = attempts,
                max_attempts = self.config.max_retries,
                phone = %mask_phone_number(to),
                "Sending SMS via AWS SNS"
            );

            let result = self
                .client
                .publish()
                .phone_number(to)
                .message(message)
                .set_message_attributes(Some(attributes.clone()))
                .send()
                .await;

            match result {
                Ok(response) => {
                    let message_id = response.message_id().unwrap_or("unknown").to_string();
                    info!(
                        phone = %mask_phone_number(to),
                        message_id = %message_id,
                        event = "sms_sent",
                        "SMS sent successfully via AWS SNS"
                    );
                    return Ok(message_id);
                }
                Err(e) => {
                    let error_msg = DisplayErrorContext(&e).to_string();
                    error!(
                        attempt = attempts,
                        error = %error_msg,
                        event = "sms_send_failed",
                        "Failed to send SMS via AWS SNS"
                    );

                    if is_invalid_request(&error_msg) {
                        return Err(InfrastructureError::InvalidDestination(format!(
                            "Invalid request to AWS SNS: {}",
                            error_msg
                        )));
                    }
                    if attempts >= self.config.max_retries || !is_retryable(&error_msg) {
                        return Err(InfrastructureError::Provider {
                            provider: "AWS SNS".to_string(),
                            message: format!("giving up after {} attempt(s): {}", attempts, error_msg),
                        });
                    }

                    warn!(delay = ?delay, "Retryable AWS SNS error, backing off");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl SmsChannel for SnsSmsChannel {
    async fn send_sms(&self, destination: &str, message: &str) -> Result<(), ChannelError> {
        let destination = validate_e164(destination).map_err(|e| e.into_channel_error(PROVIDER))?;

        if message.len() > MAX_MESSAGE_LENGTH {
            return Err(ChannelError::Rejected {
                provider: PROVIDER.to_string(),
                message: format!("Message exceeds maximum length of {} characters", MAX_MESSAGE_LENGTH),
            });
        }

        self.send_with_retry(&destination, message)
            .await
            .map(|_| ())
            .map_err(|e| e.into_channel_error(PROVIDER))
    }
}
