//! Configuration loading
//!
//! Sources, lowest precedence first:
//! - Built-in defaults for the detected environment
//! - Optional `config/{environment}.toml` (or any format the `config` crate reads)
//! - `APP__`-prefixed environment variables, `__` separating nested keys
//!   (e.g. `APP__OTP__TTL_SECONDS=600`, `APP__STORE__BACKEND=redis`)

use ::config::{Config, Environment as EnvSource, File};
use otp_shared::config::{AppConfig, Environment};
use tracing::{debug, info};

use crate::InfrastructureError;

/// Prefix of environment variables overriding configuration keys
pub const ENV_PREFIX: &str = "APP";

/// Load and validate the application configuration
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let environment = Environment::from_env();
    load_config_for(environment)
}

/// Load configuration for an explicit environment
pub fn load_config_for(environment: Environment) -> Result<AppConfig, InfrastructureError> {
    debug!(environment = %environment, "Loading configuration");

    let defaults = Config::try_from(&AppConfig::for_environment(environment))
        .map_err(|e| InfrastructureError::Config(format!("Invalid defaults: {}", e)))?;

    let settings = Config::builder()
        .add_source(defaults)
        .add_source(File::with_name(environment.config_file()).required(false))
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| InfrastructureError::Config(format!("Failed to read configuration: {}", e)))?;

    let mut config: AppConfig = settings
        .try_deserialize()
        .map_err(|e| InfrastructureError::Config(format!("Invalid configuration: {}", e)))?;

    // The detected environment wins over any file or variable value
    config.environment = environment;

    config.validate().map_err(InfrastructureError::Config)?;

    info!(
        environment = %config.environment,
        store_backend = ?config.store.backend,
        mail_provider = %config.mail.provider,
        "Configuration loaded"
    );

    Ok(config)
}
