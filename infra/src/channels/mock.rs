//! Mock Channel Implementations
//!
//! Development and test stand-ins for every delivery port. They print what
//! would be sent to the console, record it for inspection and never contact
//! an external service.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use vk_core::errors::ChannelError;
use vk_core::services::verification::{
    EmailChannel, EmailMessage, NumberTypeLookup, SmsChannel, VoiceChannel,
};
use vk_shared::phone::{mask_email_address, mask_phone_number};
use vk_shared::ChannelConfig;

use super::validate_e164;
use crate::{InfrastructureError, InfrastructureServices};

const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

/// Build the mock port set
///
/// SMS, voice and lookup are always available; email needs a sender address.
pub fn services(config: &ChannelConfig) -> InfrastructureServices {
    InfrastructureServices {
        sms: Some(Arc::new(MockSmsChannel::new())),
        voice: Some(Arc::new(MockVoiceChannel::new())),
        lookup: Some(Arc::new(MockNumberTypeLookup::new())),
        email: config
            .from_email_address()
            .map(|_| Arc::new(MockEmailChannel::new()) as Arc<dyn EmailChannel>),
    }
}

fn lock<T>(records: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn print_banner(title: &str, count: u64, lines: &[(&str, &str)]) {
    println!("\n{}", "=".repeat(60));
    println!("{} - MESSAGE #{}", title, count);
    println!("{}", "=".repeat(60));
    for (label, value) in lines {
        println!("{}: {}", label, value);
    }
    println!("{}\n", "=".repeat(60));
}

/// Mock SMS channel
#[derive(Clone)]
pub struct MockSmsChannel {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Every (destination, message) accepted so far
    sent: Arc<Mutex<Vec<(String, String)>>>,
    /// Whether to simulate failures
    simulate_failure: Arc<AtomicBool>,
    /// Whether to print messages to console
    console_output: bool,
    latency: Duration,
}

impl MockSmsChannel {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock channel with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
            latency: DEFAULT_LATENCY,
        }
    }

    /// Override the simulated network delay
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<(String, String)> {
        lock(&self.sent).clone()
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

impl Default for MockSmsChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsChannel for MockSmsChannel {
    async fn send_sms(&self, destination: &str, message: &str) -> Result<(), ChannelError> {
        let destination = validate_e164(destination).map_err(|e| e.into_channel_error("mock_sms"))?;
        let masked_phone = mask_phone_number(&destination);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(phone = %masked_phone, event = "mock_sms_failure", "Mock SMS channel simulating failure");
            return Err(ChannelError::transport("mock_sms", "Simulated SMS sending failure"));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.console_output {
            print_banner(
                "MOCK SMS CHANNEL",
                count,
                &[
                    ("To", destination.as_str()),
                    ("Message ID", message_id.as_str()),
                    ("Content", message),
                ],
            );
        }

        info!(
            provider = "mock",
            phone = %masked_phone,
            message_id = %message_id,
            message_length = message.len(),
            event = "sms_sent",
            "SMS sent successfully (mock)"
        );

        tokio::time::sleep(self.latency).await;
        lock(&self.sent).push((destination, message.to_string()));
        Ok(())
    }
}

/// Mock voice channel
#[derive(Clone)]
pub struct MockVoiceChannel {
    call_count: Arc<AtomicU64>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    simulate_failure: Arc<AtomicBool>,
    console_output: bool,
    latency: Duration,
}

impl MockVoiceChannel {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            call_count: Arc::new(AtomicU64::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
            latency: DEFAULT_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every (destination, spoken message) placed so far
    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.calls).clone()
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

impl Default for MockVoiceChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceChannel for MockVoiceChannel {
    async fn place_voice_call(&self, destination: &str, spoken_message: &str) -> Result<(), ChannelError> {
        let destination =
            validate_e164(destination).map_err(|e| e.into_channel_error("mock_voice"))?;
        let masked_phone = mask_phone_number(&destination);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(phone = %masked_phone, event = "mock_call_failure", "Mock voice channel simulating failure");
            return Err(ChannelError::transport("mock_voice", "Simulated call failure"));
        }

        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.console_output {
            print_banner(
                "MOCK VOICE CHANNEL",
                count,
                &[("To", destination.as_str()), ("Spoken", spoken_message)],
            );
        }

        info!(
            provider = "mock",
            phone = %masked_phone,
            event = "voice_call_placed",
            "Voice call placed (mock)"
        );

        tokio::time::sleep(self.latency).await;
        lock(&self.calls).push((destination, spoken_message.to_string()));
        Ok(())
    }
}

/// Mock number type lookup
///
/// Answers `"mobile"` unless told otherwise, globally or per number.
#[derive(Clone)]
pub struct MockNumberTypeLookup {
    answer: Option<String>,
    overrides: HashMap<String, Option<String>>,
    lookup_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
}

impl MockNumberTypeLookup {
    pub fn new() -> Self {
        Self {
            answer: Some("mobile".to_string()),
            overrides: HashMap::new(),
            lookup_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Answer for numbers without an override; `None` reports no type
    pub fn with_answer(mut self, answer: Option<&str>) -> Self {
        self.answer = answer.map(str::to_string);
        self
    }

    /// Answer for one E.164 number
    pub fn with_override(mut self, destination: &str, answer: Option<&str>) -> Self {
        self.overrides
            .insert(destination.to_string(), answer.map(str::to_string));
        self
    }

    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.load(Ordering::SeqCst)
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

impl Default for MockNumberTypeLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NumberTypeLookup for MockNumberTypeLookup {
    async fn lookup_number_type(&self, destination: &str) -> Result<Option<String>, ChannelError> {
        let destination =
            validate_e164(destination).map_err(|e| e.into_channel_error("mock_lookup"))?;
        self.lookup_count.fetch_add(1, Ordering::SeqCst);

        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err(ChannelError::transport("mock_lookup", "Simulated lookup failure"));
        }

        let answer = self
            .overrides
            .get(&destination)
            .cloned()
            .unwrap_or_else(|| self.answer.clone());

        info!(
            provider = "mock",
            phone = %mask_phone_number(&destination),
            number_type = ?answer,
            event = "number_type_lookup",
            "Number type looked up (mock)"
        );
        Ok(answer)
    }
}

/// Mock email channel
#[derive(Clone)]
pub struct MockEmailChannel {
    message_count: Arc<AtomicU64>,
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    simulate_failure: Arc<AtomicBool>,
    console_output: bool,
    latency: Duration,
}

impl MockEmailChannel {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
            latency: DEFAULT_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

impl Default for MockEmailChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailChannel for MockEmailChannel {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ChannelError> {
        if !vk_shared::validation::is_valid_email(&message.to) {
            return Err(InfrastructureError::InvalidDestination(format!(
                "Invalid email address: {}",
                mask_email_address(&message.to)
            ))
            .into_channel_error("mock_email"));
        }
        let masked_address = mask_email_address(&message.to);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(email = %masked_address, event = "mock_email_failure", "Mock email channel simulating failure");
            return Err(ChannelError::transport("mock_email", "Simulated email sending failure"));
        }

        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.console_output {
            print_banner(
                "MOCK EMAIL CHANNEL",
                count,
                &[
                    ("To", message.to.as_str()),
                    ("From", message.from.as_str()),
                    ("Subject", message.subject.as_str()),
                    ("Text", message.text_body.as_deref().unwrap_or("-")),
                    ("HTML", message.html_body.as_deref().unwrap_or("-")),
                ],
            );
        }

        info!(
            provider = "mock",
            email = %masked_address,
            html = message.html_body.is_some(),
            text = message.text_body.is_some(),
            event = "email_sent",
            "Email sent successfully (mock)"
        );

        tokio::time::sleep(self.latency).await;
        lock(&self.sent).push(message.clone());
        Ok(())
    }
}
