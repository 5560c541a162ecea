//! Processor configuration.
//!
//! Loaded from environment variables (and a `.env` file when present) with the
//! defaults below.

use crate::error::{PaymentError, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_UPI_SUCCESS_RATE: f64 = 0.90;
pub const DEFAULT_CARD_SUCCESS_RATE: f64 = 0.95;
pub const DEFAULT_DELAY_MIN_MS: u64 = 5_000;
pub const DEFAULT_DELAY_MAX_MS: u64 = 10_000;
pub const DEFAULT_TEST_DELAY_MS: u64 = 1_000;

/// Knobs consumed by the payment processor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingConfig {
    /// Probability in [0, 1] that a UPI payment succeeds
    pub upi_success_rate: f64,
    /// Probability in [0, 1] that a card payment succeeds
    pub card_success_rate: f64,
    pub delay_min: Duration,
    pub delay_max: Duration,
    /// Replaces the random delay and outcome with fixed values
    pub test_mode: bool,
    pub test_payment_success: bool,
    pub test_delay: Duration,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            upi_success_rate: DEFAULT_UPI_SUCCESS_RATE,
            card_success_rate: DEFAULT_CARD_SUCCESS_RATE,
            delay_min: Duration::from_millis(DEFAULT_DELAY_MIN_MS),
            delay_max: Duration::from_millis(DEFAULT_DELAY_MAX_MS),
            test_mode: false,
            test_payment_success: true,
            test_delay: Duration::from_millis(DEFAULT_TEST_DELAY_MS),
        }
    }
}

impl ProcessingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            upi_success_rate: parse_var(&lookup, "UPI_SUCCESS_RATE", DEFAULT_UPI_SUCCESS_RATE)?,
            card_success_rate: parse_var(&lookup, "CARD_SUCCESS_RATE", DEFAULT_CARD_SUCCESS_RATE)?,
            delay_min: Duration::from_millis(parse_var(
                &lookup,
                "PROCESSING_DELAY_MIN",
                DEFAULT_DELAY_MIN_MS,
            )?),
            delay_max: Duration::from_millis(parse_var(
                &lookup,
                "PROCESSING_DELAY_MAX",
                DEFAULT_DELAY_MAX_MS,
            )?),
            test_mode: parse_var(&lookup, "TEST_MODE", false)?,
            test_payment_success: parse_var(&lookup, "TEST_PAYMENT_SUCCESS", true)?,
            test_delay: Duration::from_millis(parse_var(
                &lookup,
                "TEST_PROCESSING_DELAY",
                DEFAULT_TEST_DELAY_MS,
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Test-mode configuration with a fixed outcome and delay.
    pub fn test(success: bool, delay: Duration) -> Self {
        Self {
            test_mode: true,
            test_payment_success: success,
            test_delay: delay,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("UPI_SUCCESS_RATE", self.upi_success_rate),
            ("CARD_SUCCESS_RATE", self.card_success_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PaymentError::Config(format!(
                    "{name} must be between 0 and 1, got {rate}"
                )));
            }
        }

        if self.delay_min > self.delay_max {
            return Err(PaymentError::Config(format!(
                "PROCESSING_DELAY_MIN ({}ms) exceeds PROCESSING_DELAY_MAX ({}ms)",
                self.delay_min.as_millis(),
                self.delay_max.as_millis()
            )));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| PaymentError::Config(format!("Invalid {name}: {raw}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ProcessingConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ProcessingConfig::default());
        assert_eq!(config.delay_min, Duration::from_millis(5_000));
        assert!(!config.test_mode);
    }

    #[test]
    fn test_overrides() {
        let config = ProcessingConfig::from_lookup(lookup_from(&[
            ("UPI_SUCCESS_RATE", "0.5"),
            ("CARD_SUCCESS_RATE", "1"),
            ("PROCESSING_DELAY_MIN", "10"),
            ("PROCESSING_DELAY_MAX", "20"),
            ("TEST_MODE", "true"),
            ("TEST_PAYMENT_SUCCESS", "false"),
            ("TEST_PROCESSING_DELAY", "5"),
        ]))
        .unwrap();

        assert_eq!(config.upi_success_rate, 0.5);
        assert_eq!(config.card_success_rate, 1.0);
        assert_eq!(config.delay_max, Duration::from_millis(20));
        assert!(config.test_mode);
        assert!(!config.test_payment_success);
        assert_eq!(config.test_delay, Duration::from_millis(5));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_rate = ProcessingConfig::from_lookup(lookup_from(&[("UPI_SUCCESS_RATE", "1.5")]));
        assert!(matches!(bad_rate, Err(PaymentError::Config(_))));

        let unparsable = ProcessingConfig::from_lookup(lookup_from(&[("TEST_MODE", "maybe")]));
        assert!(matches!(unparsable, Err(PaymentError::Config(_))));

        let inverted = ProcessingConfig::from_lookup(lookup_from(&[
            ("PROCESSING_DELAY_MIN", "500"),
            ("PROCESSING_DELAY_MAX", "100"),
        ]));
        assert!(matches!(inverted, Err(PaymentError::Config(_))));
    }
}
