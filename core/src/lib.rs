//! # VerificationKit Core
//!
//! Verification orchestration engine. Issues short numeric codes, routes them
//! over SMS, voice call or email through pluggable channel ports, applies the
//! region and number-type policy, and tracks each attempt as a session that
//! confirms at most once.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
