use std::str::FromStr;

use serde::{Deserialize, Serialize};

use shopkit_core::ValueObject;

/// Shipping fees, free-shipping threshold and tax rate, all in integer
/// cents / basis points.
///
/// The defaults match the storefront's published rates; deployments override
/// them through environment variables at service build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Discounted subtotal at or above this ships free.
    pub free_shipping_threshold_cents: u64,
    pub standard_shipping_cents: u64,
    pub express_shipping_cents: u64,
    /// Tax rate in basis points (800 = 8%).
    pub tax_rate_bps: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold_cents: 10_000,
            standard_shipping_cents: 599,
            express_shipping_cents: 1_499,
            tax_rate_bps: 800,
        }
    }
}

impl PricingConfig {
    /// Read the pricing configuration from the environment.
    ///
    /// Every variable is optional; an unset or unparsable value falls back to
    /// the default for that field (with a warning, so a typo in deployment
    /// config is visible rather than silently ignored).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            free_shipping_threshold_cents: env_or(
                "FREE_SHIPPING_THRESHOLD_CENTS",
                defaults.free_shipping_threshold_cents,
            ),
            standard_shipping_cents: env_or(
                "STANDARD_SHIPPING_CENTS",
                defaults.standard_shipping_cents,
            ),
            express_shipping_cents: env_or(
                "EXPRESS_SHIPPING_CENTS",
                defaults.express_shipping_cents,
            ),
            tax_rate_bps: env_or("TAX_RATE_BPS", defaults.tax_rate_bps),
        }
    }
}

impl ValueObject for PricingConfig {}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + core::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("{key}={raw} is not a valid value; using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}
