//! Shared utilities and common types for VerificationKit
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration types and layered loading
//! - Utility functions (phone masking, email validation)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ChannelConfig, ConfigError, Environment, LogFormat, LoggingConfig,
    MessagingConfig, RegionConfig,
};
pub use utils::{phone, validation};
