//! Value objects representing immutable domain concepts.

pub mod number_type;
pub mod region;

// Re-export commonly used types
pub use number_type::{AcceptedNumberTypes, PhoneNumberType};
pub use region::{RegionCatalog, RegionInfo, NON_GEOGRAPHIC_REGION};
