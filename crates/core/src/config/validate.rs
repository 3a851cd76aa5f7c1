use super::{types::Config, ConfigError};

/// Validate configuration
///
/// Quality values are clamped at use and are not checked here.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.ticket.template_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "ticket.template_id cannot be empty".to_string(),
        ));
    }

    if config.ticket.qr_size == 0 {
        return Err(ConfigError::ValidationError(
            "ticket.qr_size must be greater than 0".to_string(),
        ));
    }

    if let Some(counter) = &config.ticket.counter {
        if counter.digit_height < 5 {
            return Err(ConfigError::ValidationError(
                "ticket.counter.digit_height must be at least 5".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&counter.opacity) {
            return Err(ConfigError::ValidationError(
                "ticket.counter.opacity must be between 0 and 1".to_string(),
            ));
        }
    }

    if config.batch.wave_size == 0 {
        return Err(ConfigError::ValidationError(
            "batch.wave_size must be greater than 0".to_string(),
        ));
    }

    if config.batch.compression_level > 9 {
        return Err(ConfigError::ValidationError(format!(
            "batch.compression_level must be 0-9, got {}",
            config.batch.compression_level
        )));
    }

    if config.progress.completed_ttl_secs > config.progress.abandoned_ttl_secs {
        return Err(ConfigError::ValidationError(
            "progress.completed_ttl_secs cannot exceed progress.abandoned_ttl_secs".to_string(),
        ));
    }

    if config.progress.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "progress.sweep_interval_secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
