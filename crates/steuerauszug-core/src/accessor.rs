//! Collaborator traits the calculators depend on but never implement
//! themselves. Memoization, caching, and where the data actually comes
//! from (a bundled ESTV Kursliste, a network fetch, a test fixture) are
//! all the implementation's problem, not the core's.

use crate::model::{Da1Rate, KlSecurity};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Looks up ESTV Kursliste data by security identifier and tax year.
/// Implementations are expected to memoize; the core never caches a
/// lookup result itself.
pub trait KurslisteAccessor {
    fn security(&self, isin: Option<&str>, valor_number: Option<&str>, year: i32) -> Option<&KlSecurity>;

    /// Resolve a security by its own valor number, used when a stock
    /// split's legend points at a different security by `valorNumberNew`
    /// rather than by ISIN.
    fn security_by_valor(&self, valor_number: &str, year: i32) -> Option<&KlSecurity>;

    fn da1_rate(
        &self,
        country: &str,
        security_group: &str,
        security_type: Option<&str>,
        date: NaiveDate,
    ) -> Option<&Da1Rate>;
}

/// Resolves a currency's exchange rate against CHF for a given date. Used
/// only when a payment carries no `exchangeRate` of its own.
pub trait ExchangeRateProvider {
    fn exchange_rate(&self, currency: &str, date: NaiveDate) -> Option<Decimal>;
}

/// Lets a caller override the ESTV payment sign for a specific security
/// and date, e.g. to correct a misclassified corporate action. A bare
/// letter returned here (`"Q"` rather than `"(Q)"`) is wrapped in
/// parentheses by the caller before being compared against the known
/// sign set.
pub trait FlagOverrideProvider {
    fn sign_override(&self, identifier: &str, date: NaiveDate) -> Option<String>;
}

/// Wrap a bare letter sign override in parentheses; a value already in
/// `(X)` form is returned unchanged.
pub fn normalize_sign_override(raw: &str) -> String {
    if raw.starts_with('(') && raw.ends_with(')') {
        raw.to_string()
    } else {
        format!("({raw})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_bare_letter() {
        assert_eq!(normalize_sign_override("Q"), "(Q)");
    }

    #[test]
    fn leaves_parenthesized_value_unchanged() {
        assert_eq!(normalize_sign_override("(KG)"), "(KG)");
    }
}
