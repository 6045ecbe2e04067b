//! Domain entities representing the contact points being verified.

pub mod contact_target;
pub mod phone_number;

// Re-export commonly used types
pub use contact_target::ContactTarget;
pub use phone_number::PhoneNumber;
