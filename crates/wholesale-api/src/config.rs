//! Server configuration read from the environment.

use std::str::FromStr;

use rust_decimal::Decimal;
use wholesale_pricing::{Money, PricingPolicy};

use crate::error::AppError;

/// Settings the server needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// `PostgreSQL` URL. Without one, events are kept in memory.
    pub database_url: Option<String>,
    /// Pool size for the `PostgreSQL` store.
    pub database_max_connections: u32,
    /// Shipping rules applied to every cart and order.
    pub pricing: PricingPolicy,
}

impl ApiConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PricingPolicy::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            pricing: PricingPolicy {
                free_shipping_threshold: money_or(
                    &lookup,
                    "FREE_SHIPPING_THRESHOLD",
                    defaults.free_shipping_threshold,
                )?,
                flat_shipping_fee: money_or(
                    &lookup,
                    "FLAT_SHIPPING_FEE",
                    defaults.flat_shipping_fee,
                )?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
    }
}

fn money_or<F>(lookup: &F, key: &str, default: Money) -> Result<Money, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount: Decimal = parse_or(lookup, key, default.amount())?;
    if amount.is_sign_negative() {
        return Err(AppError::Config(format!("{key} must not be negative")));
    }
    Ok(Money::new(amount))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.pricing, PricingPolicy::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/wholesale"),
            ("FREE_SHIPPING_THRESHOLD", "7500"),
            ("FLAT_SHIPPING_FEE", "149.50"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/wholesale")
        );
        assert_eq!(config.pricing.free_shipping_threshold, Money::from_major(7_500));
        assert_eq!(config.pricing.flat_shipping_fee, Money::from_minor(14_950));
    }

    #[test]
    fn test_malformed_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();

        assert!(matches!(err, AppError::Config(message) if message.starts_with("PORT")));
    }

    #[test]
    fn test_negative_fee_is_rejected() {
        let err = config_from(&[("FLAT_SHIPPING_FEE", "-1")]).unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();

        assert_eq!(config.database_url, None);
    }
}
