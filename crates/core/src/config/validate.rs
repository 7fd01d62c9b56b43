use super::{types::Config, ConfigError};

/// Validate semantic constraints that serde cannot express.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let tiers = &config.tiers;
    for (name, value) in [
        ("tiers.stage", &tiers.stage),
        ("tiers.curated", &tiers.curated),
        ("tiers.application", &tiers.application),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{name} must not be empty"
            )));
        }
    }

    if tiers.stage == tiers.curated
        || tiers.curated == tiers.application
        || tiers.stage == tiers.application
    {
        return Err(ConfigError::ValidationError(
            "tier container names must be distinct".to_string(),
        ));
    }

    if config.router.size_threshold_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "router.size_threshold_bytes must be greater than zero".to_string(),
        ));
    }

    if config.router.fast_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "router.fast_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.router.batch_poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "router.batch_poll_interval_secs must be greater than zero".to_string(),
        ));
    }

    if let Some(units) = &config.units {
        for converter in &units.converters {
            if converter.fast_endpoint.is_none() && converter.batch.is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "converter for tier={} format={} declares no endpoint",
                    converter.tier.as_str(),
                    converter.format.as_str()
                )));
            }
        }

        if let Some(warehouse) = &units.warehouse {
            if warehouse.account_url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "units.warehouse.account_url must not be empty".to_string(),
                ));
            }
            if warehouse.auth_token.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "units.warehouse.auth_token must not be empty".to_string(),
                ));
            }
        }
    }

    Ok(())
}
