//! Common utility functions

pub mod phone;
pub mod validation;

// Re-export commonly used utilities
pub use phone::{digits_only, mask_email_address, mask_phone_number};
pub use validation::{is_valid_email, not_blank};
