//! Services containing the verification logic.

pub mod region;
pub mod verification;

// Re-export commonly used types
pub use region::RegionResolver;
pub use verification::{
    ChannelDispatcher, CodeGenerator, Completion, EmailChannel, EmailMessage, MessageTemplates,
    NumberTypeLookup, RandomCodeGenerator, SessionSnapshot, SessionState, SmsChannel,
    SubmitOutcome, ValidationHook, VerificationService, VerificationServiceBuilder,
    VerificationServiceConfig, VerificationSession, VoiceChannel,
};
