//! Lambda-backed number type lookup and phone call channels
//!
//! The lookup function receives `{"phoneNumber": "+1..."}` and answers with a
//! JSON string such as `"mobile"`, or `null` when the type is unknown. The
//! phone call function receives `{"to": "+1...", "twiML": "<Response>..."}`.

use async_trait::async_trait;
use aws_sdk_lambda::{error::DisplayErrorContext, primitives::Blob, Client as LambdaClient};
use serde::Serialize;
use tracing::{debug, info};

use vk_core::errors::ChannelError;
use vk_core::services::verification::{NumberTypeLookup, VoiceChannel};
use vk_shared::phone::mask_phone_number;

use crate::channels::validate_e164;
use crate::InfrastructureError;

const LOOKUP_PROVIDER: &str = "aws_lambda_lookup";
const PHONECALL_PROVIDER: &str = "aws_lambda_phonecall";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    phone_number: &'a str,
}

#[derive(Serialize)]
struct PhoneCallRequest<'a> {
    to: &'a str,
    #[serde(rename = "twiML")]
    twiml: &'a str,
}

/// Invoke a function synchronously and return its response payload
async fn invoke(
    client: &LambdaClient,
    function: &str,
    payload: Vec<u8>,
) -> Result<Vec<u8>, InfrastructureError> {
    let response = client
        .invoke()
        .function_name(function)
        .payload(Blob::new(payload))
        .send()
        .await
        .map_err(|e| InfrastructureError::Provider {
            provider: format!("AWS Lambda ({})", function),
            message: DisplayErrorContext(&e).to_string(),
        })?;

    if let Some(function_error) = response.function_error() {
        return Err(InfrastructureError::Provider {
            provider: format!("AWS Lambda ({})", function),
            message: format!("function error: {}", function_error),
        });
    }

    Ok(response
        .payload()
        .map(|blob| blob.as_ref().to_vec())
        .unwrap_or_default())
}

/// Read the lookup function's answer
fn parse_number_type(payload: &[u8]) -> Result<Option<String>, InfrastructureError> {
    if payload.is_empty() {
        return Err(InfrastructureError::Response("empty lookup payload".to_string()));
    }
    let number_type: Option<String> = serde_json::from_slice(payload)?;
    Ok(number_type.filter(|t| !t.trim().is_empty()))
}

/// Number type lookup through a Lambda function
pub struct LambdaNumberTypeLookup {
    client: LambdaClient,
    function: String,
}

impl LambdaNumberTypeLookup {
    pub fn new(client: LambdaClient, function: impl Into<String>) -> Self {
        Self {
            client,
            function: function.into(),
        }
    }

    async fn lookup(&self, destination: &str) -> Result<Option<String>, InfrastructureError> {
        let destination = validate_e164(destination)?;
        let payload = serde_json::to_vec(&LookupRequest {
            phone_number: &destination,
        })?;

        debug!(function = %self.function, phone = %mask_phone_number(&destination), "Invoking lookup function");
        let response = invoke(&self.client, &self.function, payload).await?;
        let number_type = parse_number_type(&response)?;

        info!(
            phone = %mask_phone_number(&destination),
            number_type = ?number_type,
            event = "number_type_lookup",
            "Number type looked up via AWS Lambda"
        );
        Ok(number_type)
    }
}

#[async_trait]
impl NumberTypeLookup for LambdaNumberTypeLookup {
    async fn lookup_number_type(&self, destination: &str) -> Result<Option<String>, ChannelError> {
        self.lookup(destination)
            .await
            .map_err(|e| e.into_channel_error(LOOKUP_PROVIDER))
    }
}

/// Voice call channel through a Lambda function
pub struct LambdaVoiceChannel {
    client: LambdaClient,
    function: String,
}

impl LambdaVoiceChannel {
    pub fn new(client: LambdaClient, function: impl Into<String>) -> Self {
        Self {
            client,
            function: function.into(),
        }
    }

    async fn call(&self, destination: &str, twiml: &str) -> Result<(), InfrastructureError> {
        let destination = validate_e164(destination)?;
        let payload = serde_json::to_vec(&PhoneCallRequest {
            to: &destination,
            twiml,
        })?;

        invoke(&self.client, &self.function, payload).await?;
        info!(
            phone = %mask_phone_number(&destination),
            event = "voice_call_placed",
            "Voice call placed via AWS Lambda"
        );
        Ok(())
    }
}

#[async_trait]
impl VoiceChannel for LambdaVoiceChannel {
    async fn place_voice_call(&self, destination: &str, spoken_message: &str) -> Result<(), ChannelError> {
        self.call(destination, spoken_message)
            .await
            .map_err(|e| e.into_channel_error(PHONECALL_PROVIDER))
    }
}
