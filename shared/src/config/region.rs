//! Region selection configuration

use serde::{Deserialize, Serialize};

/// Region (country picker) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegionConfig {
    /// ISO 3166-1 alpha-2 region selected before the user picks one
    #[serde(default = "default_region")]
    pub default_region: String,

    /// Regions the user may not select (ISO 3166-1 alpha-2)
    #[serde(default)]
    pub blacklisted_country_codes: Vec<String>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
            blacklisted_country_codes: Vec::new(),
        }
    }
}

impl RegionConfig {
    /// Blacklist entries normalised to upper case with blanks removed
    pub fn normalized_blacklist(&self) -> Vec<String> {
        self.blacklisted_country_codes
            .iter()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .collect()
    }
}

fn default_region() -> String {
    String::from("US")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_config() {
        let config = RegionConfig::default();
        assert_eq!(config.default_region, "US");
        assert!(config.blacklisted_country_codes.is_empty());
    }

    #[test]
    fn test_normalized_blacklist() {
        let config = RegionConfig {
            default_region: "GB".to_string(),
            blacklisted_country_codes: vec![" cu".to_string(), "".to_string(), "KP".to_string()],
        };
        assert_eq!(config.normalized_blacklist(), vec!["CU".to_string(), "KP".to_string()]);
    }
}
