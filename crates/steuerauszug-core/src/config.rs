//! Configuration for the calculation engine.
//!
//! Values here are constants drawn from the tax code (the withholding tax
//! rate) rather than user preferences, so the only override mechanism is
//! an explicitly supplied TOML string — there is no filesystem or
//! home-directory probing. That kind of environment discovery belongs to
//! a CLI front end, not the engine.

use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

static EMBEDDED_CONFIG: &str = include_str!("../data/config.toml");

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    with_holding_tax_rate: String,
    assume_zero_if_no_balances: bool,
}

/// Engine-wide constants used by the calculators.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The statutory Swiss withholding tax rate (35%), used to compute
    /// `withHoldingTaxClaim` from a payment's CHF amount.
    pub with_holding_tax_rate: Decimal,
    /// Whether the position reconciler may treat a security with no prior
    /// balance at all as starting from zero, rather than reporting it
    /// unreconcilable.
    pub assume_zero_if_no_balances: bool,
}

impl Config {
    /// The embedded default configuration, compiled into the binary.
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_CONFIG).expect("embedded config.toml is valid")
    }

    /// Parse configuration from a TOML string, e.g. one supplied by a
    /// caller that wants to override the embedded defaults.
    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;
        let with_holding_tax_rate = Decimal::from_str(&raw.with_holding_tax_rate)
            .map_err(|e| CoreError::Config(format!("invalid with_holding_tax_rate: {e}")))?;
        Ok(Self {
            with_holding_tax_rate,
            assume_zero_if_no_balances: raw.assume_zero_if_no_balances,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn embedded_config_loads() {
        let config = Config::embedded();
        assert_eq!(config.with_holding_tax_rate, dec!(0.35));
    }

    #[test]
    fn override_replaces_embedded_values() {
        let config = Config::from_toml(
            "with_holding_tax_rate = \"0.30\"\nassume_zero_if_no_balances = false\n",
        )
        .expect("valid toml");
        assert_eq!(config.with_holding_tax_rate, dec!(0.30));
        assert!(!config.assume_zero_if_no_balances);
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let result = Config::from_toml(
            "with_holding_tax_rate = \"not-a-number\"\nassume_zero_if_no_balances = true\n",
        );
        assert!(result.is_err());
    }
}
