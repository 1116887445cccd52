//! # Application Configuration
//!
//! Settings read from the environment (and `.env`, if present).
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CHECKOUT_CURRENCY` | `usd` | Currency for orders a scenario doesn't pin |
//! | `CHECKOUT_REJECT_EXPIRED_CARDS` | `false` | Compare card expiry with today |
//! | `CHECKOUT_FINGERPRINT_KEY` | unset | HMAC key for instrument fingerprints |
//! | `LOG_FORMAT` | `pretty` | `pretty` or `json` |
//! | `CHECKOUT_ENVIRONMENT` | `development` | Free-form environment name |

use checkout_core::{Currency, PaymentError, TracingEventSink, ValidationPolicy};
use chrono::NaiveDate;
use secrecy::SecretString;
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(PaymentError::Configuration(format!(
                "LOG_FORMAT must be pretty or json (got {})",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub currency: Currency,
    pub reject_expired_cards: bool,
    pub fingerprint_key: Option<SecretString>,
    pub log_format: LogFormat,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let currency = match lookup("CHECKOUT_CURRENCY") {
            Some(value) => value.parse()?,
            None => Currency::default(),
        };

        let reject_expired_cards = match lookup("CHECKOUT_REJECT_EXPIRED_CARDS") {
            Some(value) => parse_bool("CHECKOUT_REJECT_EXPIRED_CARDS", &value)?,
            None => false,
        };

        let fingerprint_key = lookup("CHECKOUT_FINGERPRINT_KEY")
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            currency,
            reject_expired_cards,
            fingerprint_key,
            log_format,
            environment: lookup("CHECKOUT_ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn validation_policy(&self, today: NaiveDate) -> ValidationPolicy {
        if self.reject_expired_cards {
            ValidationPolicy::rejecting_expired(today)
        } else {
            ValidationPolicy::lenient()
        }
    }

    /// Tracing sink, fingerprinting instruments when a key is configured
    pub fn event_sink(&self) -> TracingEventSink {
        match &self.fingerprint_key {
            Some(key) => TracingEventSink::new().with_fingerprint_key(key.clone()),
            None => TracingEventSink::new(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, PaymentError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(PaymentError::Configuration(format!(
            "{} must be a boolean (got {})",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::PaymentEventSink;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, PaymentError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.currency, Currency::USD);
        assert!(!config.reject_expired_cards);
        assert!(config.fingerprint_key.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.environment, "development");
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("CHECKOUT_CURRENCY", "EUR"),
            ("CHECKOUT_REJECT_EXPIRED_CARDS", "yes"),
            ("CHECKOUT_FINGERPRINT_KEY", "k3y"),
            ("LOG_FORMAT", "json"),
            ("CHECKOUT_ENVIRONMENT", "production"),
        ])
        .unwrap();

        assert_eq!(config.currency, Currency::EUR);
        assert!(config.reject_expired_cards);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.is_production());
        assert!(config.event_sink().fingerprint_key().is_some());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("CHECKOUT_CURRENCY", "doge")]),
            Err(PaymentError::Configuration(_))
        ));
        assert!(matches!(
            config(&[("CHECKOUT_REJECT_EXPIRED_CARDS", "maybe")]),
            Err(PaymentError::Configuration(_))
        ));
        assert!(matches!(
            config(&[("LOG_FORMAT", "xml")]),
            Err(PaymentError::Configuration(_))
        ));
    }

    #[test]
    fn test_validation_policy() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let lenient = config(&[]).unwrap();
        assert_eq!(lenient.validation_policy(today), ValidationPolicy::lenient());

        let strict = config(&[("CHECKOUT_REJECT_EXPIRED_CARDS", "true")]).unwrap();
        assert_eq!(
            strict.validation_policy(today).expiry_reference,
            Some(today)
        );
    }
}
