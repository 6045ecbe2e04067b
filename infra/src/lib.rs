//! # Infrastructure Layer
//!
//! Concrete implementations of the verification engine's channel ports and
//! the process-level plumbing around them.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Channels**: mock adapters for development and, behind the `aws`
//!   feature, SNS (SMS), Lambda (number type lookup, phone call) and SES
//!   (email) adapters
//! - **Telemetry**: `tracing` subscriber setup from [`LoggingConfig`]
//! - **Wiring**: [`initialize`] and [`build_verification_service`] turn an
//!   [`AppConfig`] into a ready [`VerificationService`]
//!
//! ## Features
//!
//! - `aws`: Enable the AWS channel adapters (off by default)
//!
//! [`LoggingConfig`]: vk_shared::LoggingConfig

use std::sync::Arc;

use vk_core::errors::{ChannelError, DomainError};
use vk_core::services::verification::{
    EmailChannel, NumberTypeLookup, SmsChannel, VerificationService, VerificationServiceBuilder,
    VerificationServiceConfig, VoiceChannel,
};
use vk_core::RegionResolver;
use vk_shared::AppConfig;

/// Channel adapters
pub mod channels;

/// Tracing subscriber setup
pub mod telemetry;

pub use telemetry::init_tracing;

/// Channel ports resolved from configuration
///
/// Ports that the configuration does not enable stay `None`; the engine
/// reports a misconfigured channel if a session later needs one.
#[derive(Clone, Default)]
pub struct InfrastructureServices {
    pub sms: Option<Arc<dyn SmsChannel>>,
    pub voice: Option<Arc<dyn VoiceChannel>>,
    pub lookup: Option<Arc<dyn NumberTypeLookup>>,
    pub email: Option<Arc<dyn EmailChannel>>,
}

impl InfrastructureServices {
    /// Start a service builder with every available port attached
    pub fn service_builder(&self, config: VerificationServiceConfig) -> VerificationServiceBuilder {
        let mut builder = VerificationService::builder(config);
        if let Some(sms) = &self.sms {
            builder = builder.sms_channel(Arc::clone(sms));
        }
        if let Some(voice) = &self.voice {
            builder = builder.voice_channel(Arc::clone(voice));
        }
        if let Some(lookup) = &self.lookup {
            builder = builder.number_type_lookup(Arc::clone(lookup));
        }
        if let Some(email) = &self.email {
            builder = builder.email_channel(Arc::clone(email));
        }
        builder
    }
}

impl std::fmt::Debug for InfrastructureServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfrastructureServices")
            .field("sms", &self.sms.is_some())
            .field("voice", &self.voice.is_some())
            .field("lookup", &self.lookup.is_some())
            .field("email", &self.email.is_some())
            .finish()
    }
}

/// Initialize the channel ports selected by `channels.provider`
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        provider = %config.channels.provider,
        event = "infrastructure_init",
        "Initializing infrastructure services..."
    );

    let services = match config.channels.provider.as_str() {
        "mock" => channels::mock::services(&config.channels),
        #[cfg(feature = "aws")]
        "aws" => channels::aws::services(&config.channels).await?,
        #[cfg(not(feature = "aws"))]
        "aws" => {
            return Err(InfrastructureError::Config(
                "channels.provider is 'aws' but vk_infra was built without the 'aws' feature"
                    .to_string(),
            ))
        }
        other => {
            return Err(InfrastructureError::Config(format!(
                "Unsupported channel provider '{}'",
                other
            )))
        }
    };

    tracing::info!(
        services = ?services,
        event = "infrastructure_ready",
        "Infrastructure services initialized successfully"
    );

    Ok(services)
}

/// Build a verification service from the application configuration
///
/// Parses the messaging settings, creates the region context and wires the
/// configured channel ports.
pub async fn build_verification_service(
    config: &AppConfig,
) -> Result<VerificationService, InfrastructureError> {
    let service_config = VerificationServiceConfig::from_app_config(config)?;
    let regions = Arc::new(RegionResolver::from_config(&config.region)?);
    let services = initialize(config).await?;

    let service = services
        .service_builder(service_config)
        .regions(regions)
        .build()?;
    Ok(service)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Destination rejected before reaching the provider
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// Provider call failed
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    /// Provider answered with an unusable payload
    #[error("Unexpected provider response: {0}")]
    Response(String),

    /// Payload (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Tracing subscriber setup error
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Engine wiring error
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl InfrastructureError {
    /// Translate into the port-level error reported to the engine
    pub fn into_channel_error(self, provider: &str) -> ChannelError {
        let message = self.to_string();
        match self {
            InfrastructureError::InvalidDestination(_) => ChannelError::InvalidDestination {
                provider: provider.to_string(),
                message,
            },
            InfrastructureError::Response(_) | InfrastructureError::Serialization(_) => {
                ChannelError::UnexpectedResponse {
                    provider: provider.to_string(),
                    message,
                }
            }
            InfrastructureError::Config(_) => ChannelError::Rejected {
                provider: provider.to_string(),
                message,
            },
            _ => ChannelError::transport(provider, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_error_mapping() {
        let err = InfrastructureError::InvalidDestination("not E.164".to_string())
            .into_channel_error("aws_sns");
        assert!(matches!(err, ChannelError::InvalidDestination { .. }));
        assert_eq!(err.provider(), "aws_sns");

        let err = InfrastructureError::Response("null payload".to_string())
            .into_channel_error("aws_lambda");
        assert!(matches!(err, ChannelError::UnexpectedResponse { .. }));

        let err = InfrastructureError::Provider {
            provider: "SES".to_string(),
            message: "throttled".to_string(),
        }
        .into_channel_error("aws_ses");
        assert!(matches!(err, ChannelError::Transport { .. }));
        assert!(err.to_string().contains("throttled"));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let mut config = AppConfig::default();
        config.channels.provider = "carrier-pigeon".to_string();
        let result = initialize(&config).await;
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[cfg(not(feature = "aws"))]
    #[tokio::test]
    async fn test_aws_provider_requires_feature() {
        let mut config = AppConfig::default();
        config.channels.provider = "aws".to_string();
        let err = initialize(&config).await.unwrap_err();
        assert!(err.to_string().contains("'aws' feature"));
    }

    #[tokio::test]
    async fn test_mock_provider_wires_phone_ports() {
        let services = initialize(&AppConfig::default()).await.unwrap();
        assert!(services.sms.is_some());
        assert!(services.voice.is_some());
        assert!(services.lookup.is_some());
        assert!(services.email.is_none());
    }
}
