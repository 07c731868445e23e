//! Process-wide access to the embedded [`Config`], loaded once on first
//! use. Callers that need a non-default configuration should construct a
//! [`Config`] themselves and thread it through explicitly; this accessor
//! only serves the common case of running against the embedded defaults.

use crate::config::Config;
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

/// The embedded default configuration, initialized on first access.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::embedded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn returns_embedded_withholding_rate() {
        assert_eq!(get_config().with_holding_tax_rate, dec!(0.35));
    }
}
