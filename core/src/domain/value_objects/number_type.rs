//! Phone number categories and the accepted-category policy.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Category reported by a number-type lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneNumberType {
    Landline,
    Mobile,
    Voip,
}

impl PhoneNumberType {
    pub const ALL: [PhoneNumberType; 3] = [
        PhoneNumberType::Landline,
        PhoneNumberType::Mobile,
        PhoneNumberType::Voip,
    ];

    /// Wire name, as returned by lookup services
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneNumberType::Landline => "landline",
            PhoneNumberType::Mobile => "mobile",
            PhoneNumberType::Voip => "voip",
        }
    }
}

impl std::fmt::Display for PhoneNumberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhoneNumberType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "landline" => Ok(PhoneNumberType::Landline),
            "mobile" => Ok(PhoneNumberType::Mobile),
            "voip" => Ok(PhoneNumberType::Voip),
            other => Err(DomainError::config(format!(
                "unknown phone number type '{}'",
                other
            ))),
        }
    }
}

/// The set of number categories a session may deliver SMS to
///
/// When the set covers every category, dispatch sends directly without a
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcceptedNumberTypes(BTreeSet<PhoneNumberType>);

impl AcceptedNumberTypes {
    /// Every category; no lookup needed
    pub fn all() -> Self {
        PhoneNumberType::ALL.into_iter().collect()
    }

    pub fn only(types: impl IntoIterator<Item = PhoneNumberType>) -> Self {
        types.into_iter().collect()
    }

    /// Parse wire names such as `["mobile", "voip"]`
    pub fn parse<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse::<PhoneNumberType>())
            .collect()
    }

    pub fn contains(&self, number_type: PhoneNumberType) -> bool {
        self.0.contains(&number_type)
    }

    /// True when every category is accepted
    pub fn is_unrestricted(&self) -> bool {
        PhoneNumberType::ALL.iter().all(|t| self.0.contains(t))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PhoneNumberType> + '_ {
        self.0.iter().copied()
    }
}

impl Default for AcceptedNumberTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<PhoneNumberType> for AcceptedNumberTypes {
    fn from_iter<T: IntoIterator<Item = PhoneNumberType>>(iter: T) -> Self {
        AcceptedNumberTypes(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names() {
        assert_eq!("mobile".parse::<PhoneNumberType>().unwrap(), PhoneNumberType::Mobile);
        assert_eq!(" voip ".parse::<PhoneNumberType>().unwrap(), PhoneNumberType::Voip);
        assert!("pager".parse::<PhoneNumberType>().is_err());
        assert!("Mobile".parse::<PhoneNumberType>().is_err());
    }

    #[test]
    fn test_default_set_is_unrestricted() {
        let accepted = AcceptedNumberTypes::default();
        assert!(accepted.is_unrestricted());
        assert_eq!(accepted.iter().count(), 3);
    }

    #[test]
    fn test_restricted_set() {
        let accepted = AcceptedNumberTypes::only([PhoneNumberType::Mobile]);
        assert!(!accepted.is_unrestricted());
        assert!(accepted.contains(PhoneNumberType::Mobile));
        assert!(!accepted.contains(PhoneNumberType::Landline));
    }

    #[test]
    fn test_parse_set_from_config() {
        let accepted = AcceptedNumberTypes::parse(["mobile", "voip", "mobile"]).unwrap();
        assert_eq!(accepted.iter().collect::<Vec<_>>(), vec![
            PhoneNumberType::Mobile,
            PhoneNumberType::Voip,
        ]);

        assert!(AcceptedNumberTypes::parse(["mobile", "satellite"]).is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&PhoneNumberType::Landline).unwrap();
        assert_eq!(json, "\"landline\"");
    }
}
