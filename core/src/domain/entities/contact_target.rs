//! The contact point a verification session proves possession of.

use serde::{Deserialize, Serialize};

use vk_shared::utils::phone::{mask_email_address, mask_phone_number};
use vk_shared::utils::validation::is_valid_email;

use super::phone_number::PhoneNumber;
use crate::errors::{DomainError, DomainResult};

/// Phone number or email address being verified
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ContactTarget {
    Phone(PhoneNumber),
    Email(String),
}

impl ContactTarget {
    /// Wraps a phone number, rejecting one with no national digits
    pub fn phone(number: PhoneNumber) -> DomainResult<Self> {
        if number.is_empty() {
            return Err(DomainError::invalid_contact(
                "phone number contains no national digits",
            ));
        }
        if number.country_code().is_empty() {
            return Err(DomainError::invalid_contact(
                "phone number has no calling code",
            ));
        }
        Ok(ContactTarget::Phone(number))
    }

    /// Wraps a trimmed email address after a syntax check
    pub fn email(address: impl AsRef<str>) -> DomainResult<Self> {
        let address = address.as_ref().trim();
        if address.is_empty() {
            return Err(DomainError::invalid_contact("email address is blank"));
        }
        if !is_valid_email(address) {
            return Err(DomainError::invalid_contact(format!(
                "'{}' is not a valid email address",
                mask_email_address(address)
            )));
        }
        Ok(ContactTarget::Email(address.to_string()))
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, ContactTarget::Phone(_))
    }

    pub fn as_phone(&self) -> Option<&PhoneNumber> {
        match self {
            ContactTarget::Phone(number) => Some(number),
            ContactTarget::Email(_) => None,
        }
    }

    pub fn as_email(&self) -> Option<&str> {
        match self {
            ContactTarget::Email(address) => Some(address),
            ContactTarget::Phone(_) => None,
        }
    }

    /// Masked rendering safe for log output
    pub fn masked(&self) -> String {
        match self {
            ContactTarget::Phone(number) => mask_phone_number(&number.literal_form()),
            ContactTarget::Email(address) => mask_email_address(address),
        }
    }
}
