//! Mock ports for testing the verification engine

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::entities::ContactTarget;
use crate::errors::{BoxError, ChannelError};
use crate::services::verification::traits::{
    EmailChannel, EmailMessage, NumberTypeLookup, SmsChannel, ValidationHook, VoiceChannel,
};
use crate::services::verification::CodeGenerator;

// Mock SMS gateway; can hold a send open until released
#[derive(Default)]
pub struct MockSms {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub should_fail: AtomicBool,
    pub gated: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl MockSms {
    pub fn new(should_fail: bool) -> Self {
        let sms = Self::default();
        sms.should_fail.store(should_fail, Ordering::SeqCst);
        sms
    }

    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsChannel for MockSms {
    async fn send_sms(&self, destination: &str, message: &str) -> Result<(), ChannelError> {
        let fail = self.should_fail.load(Ordering::SeqCst);
        if self.gated.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if fail {
            return Err(ChannelError::transport("mock_sms", "gateway unavailable"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), message.to_string()));
        Ok(())
    }
}

// Mock voice gateway
#[derive(Default)]
pub struct MockVoice {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub should_fail: bool,
}

impl MockVoice {
    pub fn new(should_fail: bool) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail,
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceChannel for MockVoice {
    async fn place_voice_call(&self, destination: &str, spoken_message: &str) -> Result<(), ChannelError> {
        if self.should_fail {
            return Err(ChannelError::transport("mock_voice", "call failed"));
        }
        self.calls
            .lock()
            .unwrap()
            .push((destination.to_string(), spoken_message.to_string()));
        Ok(())
    }
}

// Mock number type lookup with a fixed answer
pub struct MockLookup {
    pub answer: Result<Option<String>, ChannelError>,
    pub calls: AtomicUsize,
}

impl MockLookup {
    pub fn answering(answer: Option<&str>) -> Self {
        Self {
            answer: Ok(answer.map(str::to_string)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err(ChannelError::transport("mock_lookup", "lookup timed out")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NumberTypeLookup for MockLookup {
    async fn lookup_number_type(&self, _destination: &str) -> Result<Option<String>, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

// Mock email sender
#[derive(Default)]
pub struct MockEmail {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
    pub should_fail: bool,
}

impl MockEmail {
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailChannel for MockEmail {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ChannelError> {
        if self.should_fail {
            return Err(ChannelError::Rejected {
                provider: "mock_email".to_string(),
                message: "sender not verified".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// Validation hook with a canned answer
pub enum MockHook {
    Approve,
    Decline,
    Fail,
}

#[async_trait]
impl ValidationHook for MockHook {
    async fn validate(&self, _target: &ContactTarget) -> Result<bool, BoxError> {
        match self {
            MockHook::Approve => Ok(true),
            MockHook::Decline => Ok(false),
            MockHook::Fail => Err("validation backend unreachable".into()),
        }
    }
}

// Hook that records whether it ran before the SMS was sent
pub struct OrderingHook {
    pub sms: Arc<MockSms>,
    pub sends_seen: AtomicUsize,
}

#[async_trait]
impl ValidationHook for OrderingHook {
    async fn validate(&self, _target: &ContactTarget) -> Result<bool, BoxError> {
        self.sends_seen.store(self.sms.send_count(), Ordering::SeqCst);
        Ok(true)
    }
}

// Hands out codes from a fixed list, repeating the last one
pub struct FixedCodes {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl FixedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: Mutex::new(codes.last().map(|c| c.to_string()).unwrap_or_default()),
        }
    }
}

impl CodeGenerator for FixedCodes {
    fn generate(&self, _length: usize) -> String {
        match self.codes.lock().unwrap().pop_front() {
            Some(code) => code,
            None => self.last.lock().unwrap().clone(),
        }
    }
}
