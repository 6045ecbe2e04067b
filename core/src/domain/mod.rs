//! Domain layer containing the contact entities and value objects.

pub mod entities;
pub mod value_objects;

// Re-export commonly used domain types
pub use entities::{ContactTarget, PhoneNumber};
pub use value_objects::{
    AcceptedNumberTypes, PhoneNumberType, RegionCatalog, RegionInfo, NON_GEOGRAPHIC_REGION,
};
