use std::fs;
use tracing::{debug, error, info};

use crate::types::client_config::{ClientConfig, ConfigError};

pub fn load_config(path: &str) -> Result<ClientConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: ClientConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.server.base_url.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "base_url cannot be empty".into(),
        ));
    }

    if !config.server.base_url.starts_with("http://")
        && !config.server.base_url.starts_with("https://")
    {
        return Err(ConfigError::InvalidConfig(
            "base_url must start with http:// or https://".into(),
        ));
    }

    if config.storage.session_file.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "session_file cannot be empty".into(),
        ));
    }

    Ok(())
}
