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

pub fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let base = &config.api.base_url;
    if base.is_empty() {
        return Err(ConfigError::InvalidConfig("base_url cannot be empty".into()));
    }

    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(ConfigError::InvalidConfig(
            "base_url must start with http:// or https://".into(),
        ));
    }

    if !config.api.login_path.starts_with('/') {
        return Err(ConfigError::InvalidConfig(
            "login_path must be an absolute path".into(),
        ));
    }

    if config.api.dashboard_marker.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "dashboard_marker cannot be empty".into(),
        ));
    }

    if config.poll.interval_ms == 0 {
        return Err(ConfigError::InvalidConfig(
            "poll interval_ms must be greater than 0".into(),
        ));
    }

    if config.channel.reconnect_delay_ms == 0 {
        return Err(ConfigError::InvalidConfig(
            "reconnect_delay_ms must be greater than 0".into(),
        ));
    }

    Ok(())
}
