//! Verification service: wires channel ports and starts sessions

use std::sync::Arc;

use tracing;

use vk_shared::RegionConfig;

use crate::domain::entities::{ContactTarget, PhoneNumber};
use crate::domain::value_objects::AcceptedNumberTypes;
use crate::errors::{ChannelKind, DomainError, DomainResult};
use crate::services::region::RegionResolver;

use super::code::{CodeGenerator, RandomCodeGenerator};
use super::config::VerificationServiceConfig;
use super::dispatcher::ChannelDispatcher;
use super::hooks::HookRunner;
use super::session::{SessionContext, VerificationSession};
use super::traits::{EmailChannel, NumberTypeLookup, SmsChannel, ValidationHook, VoiceChannel};
use super::types::Completion;

/// Starts verification sessions over a fixed set of channels
///
/// Sessions are independent and owned by whoever started them; the service
/// only shares the channel ports, the hook and the region context.
pub struct VerificationService {
    context: Arc<SessionContext>,
    config: VerificationServiceConfig,
}

impl VerificationService {
    pub fn builder(config: VerificationServiceConfig) -> VerificationServiceBuilder {
        VerificationServiceBuilder::new(config)
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// The shared region context
    pub fn regions(&self) -> &Arc<RegionResolver> {
        &self.context.regions
    }

    /// Start a session using the configured accepted number types
    pub fn start(&self, target: ContactTarget) -> (VerificationSession, Completion) {
        // build() already checked the configured set against the lookup port
        self.open(target, self.config.accepted_number_types.clone())
    }

    /// Start a session with its own accepted number types
    ///
    /// A restricted set on a phone target needs a lookup port; without one
    /// the session is refused with a misconfigured-channel error.
    pub fn start_with_types(
        &self,
        target: ContactTarget,
        accepted: AcceptedNumberTypes,
    ) -> DomainResult<(VerificationSession, Completion)> {
        if target.is_phone()
            && !accepted.is_unrestricted()
            && !self.context.dispatcher.has_lookup()
        {
            return Err(DomainError::misconfigured(ChannelKind::NumberTypeLookup.as_str()));
        }
        Ok(self.open(target, accepted))
    }

    fn open(
        &self,
        target: ContactTarget,
        accepted: AcceptedNumberTypes,
    ) -> (VerificationSession, Completion) {
        VerificationSession::new(
            Arc::clone(&self.context),
            target,
            accepted,
            self.config.code_length,
        )
    }

    /// Start a session for raw phone input in the effective region
    pub fn start_phone(&self, raw_number: &str) -> DomainResult<(VerificationSession, Completion)> {
        let number: PhoneNumber = self.context.regions.phone_number(raw_number);
        Ok(self.start(ContactTarget::phone(number)?))
    }

    /// Start a session for an email address
    pub fn start_email(&self, address: &str) -> DomainResult<(VerificationSession, Completion)> {
        Ok(self.start(ContactTarget::email(address)?))
    }
}

impl std::fmt::Debug for VerificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationService")
            .field("config", &self.config)
            .field("dispatcher", &self.context.dispatcher)
            .finish()
    }
}

/// Builder for [`VerificationService`]
pub struct VerificationServiceBuilder {
    config: VerificationServiceConfig,
    sms: Option<Arc<dyn SmsChannel>>,
    voice: Option<Arc<dyn VoiceChannel>>,
    lookup: Option<Arc<dyn NumberTypeLookup>>,
    email: Option<Arc<dyn EmailChannel>>,
    hook: Option<Arc<dyn ValidationHook>>,
    regions: Option<Arc<RegionResolver>>,
    generator: Option<Arc<dyn CodeGenerator>>,
}

impl VerificationServiceBuilder {
    pub fn new(config: VerificationServiceConfig) -> Self {
        Self {
            config,
            sms: None,
            voice: None,
            lookup: None,
            email: None,
            hook: None,
            regions: None,
            generator: None,
        }
    }

    pub fn sms_channel(mut self, channel: Arc<dyn SmsChannel>) -> Self {
        self.sms = Some(channel);
        self
    }

    pub fn voice_channel(mut self, channel: Arc<dyn VoiceChannel>) -> Self {
        self.voice = Some(channel);
        self
    }

    pub fn number_type_lookup(mut self, lookup: Arc<dyn NumberTypeLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn email_channel(mut self, channel: Arc<dyn EmailChannel>) -> Self {
        self.email = Some(channel);
        self
    }

    pub fn validation_hook(mut self, hook: Arc<dyn ValidationHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Share a region context; defaults to the built-in catalog with "US"
    pub fn regions(mut self, regions: Arc<RegionResolver>) -> Self {
        self.regions = Some(regions);
        self
    }

    /// Replace the OS-backed code generator
    pub fn code_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Validate the wiring and build the service
    pub fn build(self) -> DomainResult<VerificationService> {
        self.config.validate()?;

        if !self.config.accepted_number_types.is_unrestricted() && self.lookup.is_none() {
            return Err(DomainError::misconfigured(ChannelKind::NumberTypeLookup.as_str()));
        }

        let mut dispatcher = ChannelDispatcher::new(self.config.templates.clone());
        if let Some(sms) = self.sms {
            dispatcher = dispatcher.with_sms(sms);
        }
        if let Some(voice) = self.voice {
            dispatcher = dispatcher.with_voice(voice);
        }
        if let Some(lookup) = self.lookup {
            dispatcher = dispatcher.with_lookup(lookup);
        }
        if let Some(email) = self.email {
            let from = self
                .config
                .from_email_address
                .clone()
                .filter(|address| !address.trim().is_empty())
                .ok_or_else(|| DomainError::misconfigured(ChannelKind::Email.as_str()))?;
            dispatcher = dispatcher.with_email(email, from);
        }

        let regions = match self.regions {
            Some(regions) => regions,
            None => Arc::new(RegionResolver::from_config(&RegionConfig::default())?),
        };

        tracing::info!(
            code_length = self.config.code_length,
            lookup = dispatcher.has_lookup(),
            voice = dispatcher.has_voice(),
            email = dispatcher.has_email(),
            hook = self.hook.is_some(),
            event = "verification_service_built",
            "Verification service ready"
        );

        let context = SessionContext {
            dispatcher,
            hooks: HookRunner::new(self.hook),
            regions,
            generator: self
                .generator
                .unwrap_or_else(|| Arc::new(RandomCodeGenerator)),
        };

        Ok(VerificationService {
            context: Arc::new(context),
            config: self.config,
        })
    }
}
