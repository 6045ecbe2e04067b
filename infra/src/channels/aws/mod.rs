//! AWS backed channels
//!
//! - SMS through SNS `Publish`
//! - Number type lookup and phone calls through Lambda functions
//! - Email through SES `SendEmail`
//!
//! Credentials come from the default AWS provider chain.

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use tracing::info;
use vk_shared::ChannelConfig;

use crate::{InfrastructureError, InfrastructureServices};

pub mod lambda;
pub mod ses;
pub mod sns;

pub use lambda::{LambdaNumberTypeLookup, LambdaVoiceChannel};
pub use ses::SesEmailChannel;
pub use sns::{AwsSnsConfig, SnsSmsChannel};

/// Build the AWS port set
///
/// Lookup and voice are only wired when their function is configured; email
/// only when a sender address is.
pub async fn services(config: &ChannelConfig) -> Result<InfrastructureServices, InfrastructureError> {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;

    info!(region = %config.aws_region, event = "aws_config_loaded", "AWS configuration loaded");

    let sms = SnsSmsChannel::new(
        aws_sdk_sns::Client::new(&sdk_config),
        AwsSnsConfig::from_channel_config(config),
    );

    let mut services = InfrastructureServices {
        sms: Some(Arc::new(sms)),
        ..Default::default()
    };

    if config.lookup_function().is_some() || config.phonecall_function().is_some() {
        let lambda = aws_sdk_lambda::Client::new(&sdk_config);
        if let Some(function) = config.lookup_function() {
            services.lookup = Some(Arc::new(LambdaNumberTypeLookup::new(lambda.clone(), function)));
        }
        if let Some(function) = config.phonecall_function() {
            services.voice = Some(Arc::new(LambdaVoiceChannel::new(lambda, function)));
        }
    }

    if let Some(from) = config.from_email_address() {
        info!(event = "ses_enabled", "SES email channel enabled for {}", vk_shared::phone::mask_email_address(from));
        services.email = Some(Arc::new(SesEmailChannel::new(aws_sdk_ses::Client::new(&sdk_config))));
    }

    Ok(services)
}
