//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `channels` - Delivery channel provider and identifiers
//! - `environment` - Environment detection and logging configuration
//! - `messaging` - Code length, accepted number types and message templates
//! - `region` - Default region and country blacklist
//!
//! Settings are layered: built-in defaults, then an optional
//! `config.<environment>.toml` file, then `VERIFY__*` environment variables
//! (e.g. `VERIFY__CHANNELS__LOOKUP_FUNCTION=lookup-number-type`).

pub mod channels;
pub mod environment;
pub mod messaging;
pub mod region;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Re-export commonly used types
pub use channels::ChannelConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use messaging::MessagingConfig;
pub use region::RegionConfig;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "VERIFY";

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Region configuration
    #[serde(default)]
    pub region: RegionConfig,

    /// Delivery channel configuration
    #[serde(default)]
    pub channels: ChannelConfig,

    /// Messaging configuration
    #[serde(default)]
    pub messaging: MessagingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults for a given environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            logging: LoggingConfig::for_environment(environment),
            region: RegionConfig::default(),
            channels: ChannelConfig::default(),
            messaging: MessagingConfig::default(),
        }
    }

    /// Load configuration for the environment named by `ENVIRONMENT`/`ENV`/`RUST_ENV`.
    ///
    /// Reads `.env` first so its values take part in environment detection,
    /// then `.env.<environment>`. Neither file overrides variables that are
    /// already set.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_in(Path::new("."))
    }

    /// Same as [`AppConfig::load`] with the dotenv and config files under `dir`
    pub fn load_in(dir: &Path) -> Result<Self, ConfigError> {
        dotenvy::from_path(dir.join(".env")).ok();
        let environment = Environment::from_env();
        dotenvy::from_path(dir.join(environment.env_file())).ok();
        Self::load_from(environment, &dir.join(environment.config_file()))
    }

    /// Load configuration using an explicit file path (which may be absent)
    pub fn load_from(environment: Environment, file: &Path) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Self::for_environment(environment))?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("region.blacklisted_country_codes")
                    .with_list_parse_key("messaging.accepted_number_types")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;
        app_config.environment = environment;
        app_config.messaging.resolve_template_files()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channels.validate()?;
        self.messaging.validate()?;
        if self.region.default_region.trim().len() != 2 {
            return Err(ConfigError::Invalid(format!(
                "region.default_region must be an ISO 3166-1 alpha-2 code, got '{}'",
                self.region.default_region
            )));
        }
        Ok(())
    }
}
