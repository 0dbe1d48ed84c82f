//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! reported at once, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("base_url '{0}' is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("base_url scheme '{0}' is not http or https")]
    UnsupportedScheme(String),

    #[error("timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("retry.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retry.backoff_multiplier must be a finite number >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    #[error("retry.max_delay_ms ({max}) is lower than retry.base_delay_ms ({base})")]
    MaxDelayBelowBase { base: u64, max: u64 },

    #[error("retry.retryable_status_codes contains {0}, which is not an HTTP status")]
    InvalidStatusCode(u16),

    #[error("cache.default_ttl_ms must be greater than zero when the cache is enabled")]
    ZeroTtl,
}

/// Check a configuration, returning every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
        }
        Err(_) => errors.push(ValidationError::InvalidBaseUrl(config.base_url.clone())),
    }

    if config.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let retry = &config.retry;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
        errors.push(ValidationError::InvalidMultiplier(retry.backoff_multiplier));
    }
    if let Some(max) = retry.max_delay_ms {
        if max < retry.base_delay_ms {
            errors.push(ValidationError::MaxDelayBelowBase {
                base: retry.base_delay_ms,
                max,
            });
        }
    }
    for &code in &retry.retryable_status_codes {
        if !(100..=599).contains(&code) {
            errors.push(ValidationError::InvalidStatusCode(code));
        }
    }

    if config.cache.enabled && config.cache.default_ttl_ms == 0 {
        errors.push(ValidationError::ZeroTtl);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ClientConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = ClientConfig::default();
        config.base_url = "ftp://files.example.com".into();
        config.timeout_ms = 0;
        config.retry.max_attempts = 0;
        config.retry.backoff_multiplier = 0.5;
        config.retry.retryable_status_codes = vec![503, 700];
        config.cache.default_ttl_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnsupportedScheme("ftp".into()),
                ValidationError::ZeroTimeout,
                ValidationError::ZeroAttempts,
                ValidationError::InvalidMultiplier(0.5),
                ValidationError::InvalidStatusCode(700),
                ValidationError::ZeroTtl,
            ]
        );
    }

    #[test]
    fn test_nan_multiplier_and_delay_cap() {
        let mut config = ClientConfig::default();
        config.retry.backoff_multiplier = f64::NAN;
        config.retry.base_delay_ms = 500;
        config.retry.max_delay_ms = Some(100);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::InvalidMultiplier(_)));
        assert_eq!(
            errors[1],
            ValidationError::MaxDelayBelowBase { base: 500, max: 100 }
        );
    }

    #[test]
    fn test_zero_ttl_allowed_when_cache_disabled() {
        let mut config = ClientConfig::default();
        config.cache.enabled = false;
        config.cache.default_ttl_ms = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_garbage_url() {
        let mut config = ClientConfig::default();
        config.base_url = "localhost without scheme".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidBaseUrl(
                "localhost without scheme".into()
            )])
        );
    }
}
