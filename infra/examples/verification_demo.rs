//! Example walking a phone and an email verification end to end with the
//! mock channels
//!
//! Run with: cargo run -p vk_infra --example verification_demo

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use vk_core::services::verification::{SubmitOutcome, VerificationServiceConfig};
use vk_core::{AcceptedNumberTypes, PhoneNumberType, RegionResolver};
use vk_infra::channels::{MockEmailChannel, MockNumberTypeLookup, MockSmsChannel, MockVoiceChannel};
use vk_infra::{init_tracing, InfrastructureServices};
use vk_shared::AppConfig;

fn code_from(message: &str) -> String {
    message.chars().take_while(|c| c.is_ascii_digit()).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("loading configuration")?;
    config.messaging.app_name = "Demo".to_string();
    config.channels.from_email_address = Some("verify@demo.test".to_string());
    init_tracing(&config.logging)?;

    let sms = Arc::new(MockSmsChannel::new().with_latency(Duration::from_millis(20)));
    let email = Arc::new(MockEmailChannel::new());
    let lookup = Arc::new(MockNumberTypeLookup::new().with_override("+14155550123", Some("landline")));
    let services = InfrastructureServices {
        sms: Some(sms.clone()),
        voice: Some(Arc::new(MockVoiceChannel::new())),
        lookup: Some(lookup),
        email: Some(email.clone()),
    };

    let regions = Arc::new(RegionResolver::from_config(&config.region)?);
    let service_config = VerificationServiceConfig {
        accepted_number_types: AcceptedNumberTypes::only([PhoneNumberType::Mobile]),
        ..VerificationServiceConfig::from_app_config(&config)?
    };
    let service = services
        .service_builder(service_config)
        .regions(regions.clone())
        .build()?;

    println!("\n=== Phone verification in {} ===", regions.effective_region());
    let (session, mut completion) = service.start_phone("(415) 555-0100")?;
    println!("State after begin: {:?}", session.begin().await);

    println!("Wrong code: {:?}", session.submit("0000"));
    let (_, message) = sms
        .sent_messages()
        .pop()
        .ok_or_else(|| anyhow!("no SMS was sent"))?;
    let outcome = session.submit(&code_from(&message));
    println!("Right code: {:?}", outcome);
    if let SubmitOutcome::Confirmed(target) = outcome {
        println!("Verified {}", target.masked());
    }
    println!("Completion: {:?}", completion.outcome().await);

    println!("\n=== Landline is refused ===");
    let (session, mut completion) = service.start_phone("415 555 0123")?;
    println!("State after begin: {:?}", session.begin().await);
    if let Some(Err(err)) = completion.outcome().await {
        println!("Refused with {}: {}", err.code(), err);
    }

    println!("\n=== Email verification ===");
    let (session, mut completion) = service.start_email("jane@example.com")?;
    session.begin().await;
    let sent = email
        .sent_messages()
        .pop()
        .ok_or_else(|| anyhow!("no email was sent"))?;
    let code = code_from(sent.text_body.as_deref().unwrap_or_default());
    println!("Submit {}: {:?}", code, session.submit(&code));
    println!("Completion: {:?}", completion.outcome().await);

    Ok(())
}
