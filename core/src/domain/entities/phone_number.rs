//! Phone number entity with canonical and national formatting.

use phonenumber::{country, Mode};
use serde::{Deserialize, Serialize};

use vk_shared::utils::phone::digits_only;

/// A phone number split into its E.164 calling code and national digits
///
/// `national_number` only ever holds the digits 0-9. Input that carries no
/// digits, or whose digits do not fit an unsigned 64-bit integer, is stored
/// as an empty string. Leading zeros are dropped during normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// Calling code digits, e.g. `"1"` or `"44"`
    country_code: String,

    /// National significant number, digits only
    national_number: String,
}

impl PhoneNumber {
    /// Creates a phone number from a calling code and raw user input
    ///
    /// # Arguments
    ///
    /// * `country_code` - Calling code, with or without a leading `+`
    /// * `raw_number` - User input such as `"(415) 555-0100"`
    pub fn new(country_code: impl AsRef<str>, raw_number: impl AsRef<str>) -> Self {
        Self {
            country_code: digits_only(country_code.as_ref()),
            national_number: Self::normalize(raw_number.as_ref()),
        }
    }

    fn normalize(raw: &str) -> String {
        digits_only(raw)
            .parse::<u64>()
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn national_number(&self) -> &str {
        &self.national_number
    }

    /// True when no national digits survived normalisation
    pub fn is_empty(&self) -> bool {
        self.national_number.is_empty()
    }

    /// International `+<cc><nsn>` form, parsed in the context of `region`
    ///
    /// Falls back to the literal concatenation when the number cannot be
    /// parsed for that region. Never fails.
    pub fn canonical_form(&self, region: &str) -> String {
        self.parse_in(region)
            .map(|parsed| parsed.format().mode(Mode::E164).to_string())
            .unwrap_or_else(|| self.literal_form())
    }

    /// National formatting for `region`, or the raw national digits on parse failure
    pub fn national_form(&self, region: &str) -> String {
        self.parse_in(region)
            .map(|parsed| parsed.format().mode(Mode::National).to_string())
            .unwrap_or_else(|| self.national_number.clone())
    }

    /// `"+" + country_code + national_number`
    pub fn literal_form(&self) -> String {
        format!("+{}{}", self.country_code, self.national_number)
    }

    fn parse_in(&self, region: &str) -> Option<phonenumber::PhoneNumber> {
        if self.national_number.is_empty() {
            return None;
        }

        let id = region.trim().to_ascii_uppercase().parse::<country::Id>().ok();
        let parsed = phonenumber::parse(id, &self.national_number).ok()?;

        // A number parsed under the wrong region must not silently swap calling codes
        if !self.country_code.is_empty()
            && parsed.code().value().to_string() != self.country_code
        {
            return None;
        }

        Some(parsed)
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.literal_form())
    }
}
