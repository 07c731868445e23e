//! Shared formatting utilities for currency, dates, and numbers.
//!
//! This crate provides consistent formatting for diagnostic output and
//! reports: Swiss conventions throughout (apostrophe thousands separators,
//! `DD.MM.YYYY` dates), matching how ESTV and Swiss banks present amounts.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use steuerauszug_money::Currency;

/// Policy for formatting values in reports.
///
/// Currently uses Swiss conventions. Future versions may support different
/// locales for cantons that publish statements bilingually.
#[derive(Debug, Clone)]
pub struct FormattingPolicy {
    /// Date format string (default: `%d.%m.%Y`)
    pub date_format: String,
    /// Use thousands separators in currency (default: true)
    pub use_thousands_separator: bool,
}

impl Default for FormattingPolicy {
    fn default() -> Self {
        Self::swiss()
    }
}

impl FormattingPolicy {
    /// Create a new formatting policy with Swiss defaults.
    pub fn swiss() -> Self {
        Self {
            date_format: "%d.%m.%Y".to_string(),
            use_thousands_separator: true,
        }
    }
}

/// Currency formatter with configurable rounding.
///
/// Provides methods for formatting CHF amounts with proper thousands
/// separators and rounding behavior, and foreign-currency amounts
/// alongside their ISO code.
#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    #[allow(dead_code)] // Reserved for future locale-specific formatting
    policy: FormattingPolicy,
}

impl CurrencyFormatter {
    /// Create a new currency formatter with Swiss defaults.
    pub fn swiss() -> Self {
        Self {
            policy: FormattingPolicy::swiss(),
        }
    }

    /// Format an amount denominated in `currency`, rounded to that
    /// currency's minor units.
    ///
    /// For totals and tax values - figures that should be shown rounded.
    /// CHF amounts are shown bare; other currencies are suffixed with
    /// their ISO code.
    pub fn format_amount(&self, amount: Decimal, currency: Currency) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let formatted = format_decimal_fixed(rounded, 2);
        if currency == Currency::CHF {
            formatted
        } else {
            format!("{formatted} {currency}")
        }
    }

    /// Format an amount preserving full precision, for unit prices where
    /// precision matters (e.g. payment-per-unit breakdowns).
    pub fn format_unit(&self, amount: Decimal, currency: Currency) -> String {
        let value = format_decimal(amount);
        format!("{value} {currency}")
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::swiss()
    }
}

/// Format a decimal value as a CHF amount with thousands separators,
/// rounded to two decimal places.
///
/// Uses Swiss convention: the apostrophe as thousands separator and a
/// leading minus sign for negative values.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use steuerauszug_format::format_currency;
///
/// assert_eq!(format_currency(Decimal::from(1234)), "1'234.00");
/// assert_eq!(format_currency(Decimal::from(-100)), "-100.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let abs_str = format_decimal_fixed(rounded.abs(), 2);
    let mut parts = abs_str.split('.');
    let integer_part = parts.next().unwrap_or("0");
    let fractional_part = parts.next();
    let formatted_int = format_with_separator(integer_part);

    let formatted = if let Some(frac) = fractional_part {
        format!("{formatted_int}.{frac}")
    } else {
        formatted_int
    };

    if rounded.is_sign_negative() {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Add apostrophe thousands separators to an integer string.
fn format_with_separator(integer_part: &str) -> String {
    let chars: Vec<char> = integer_part.chars().collect();
    let mut result = String::with_capacity(chars.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i).is_multiple_of(3) {
            result.push('\'');
        }
        result.push(*c);
    }
    result
}

/// Format a decimal value to a fixed number of fractional digits.
pub fn format_decimal_fixed(value: Decimal, precision: u32) -> String {
    let rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.precision$}", precision = precision as usize)
}

/// Format a decimal value, removing trailing zeros after the decimal point.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use steuerauszug_format::format_decimal;
///
/// assert_eq!(format_decimal(Decimal::new(1234, 1)), "123.4");
/// assert_eq!(format_decimal(Decimal::new(12300, 2)), "123");
/// ```
pub fn format_decimal(value: Decimal) -> String {
    let s = value.to_string();
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Format a date as `DD.MM.YYYY`, the convention used on Swiss tax
/// statements.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use steuerauszug_format::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(format_date(date), "15.03.2024");
/// ```
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Format a tax period as a single calendar year, e.g. `"2023"`.
///
/// eCH-0196 tax periods always run January to December, unlike the UK's
/// split tax year.
///
/// # Examples
/// ```
/// use steuerauszug_format::format_tax_period;
///
/// assert_eq!(format_tax_period(2023), "2023");
/// ```
pub fn format_tax_period(year: i32) -> String {
    year.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_positive() {
        assert_eq!(format_currency(Decimal::from(100)), "100.00");
        assert_eq!(format_currency(Decimal::from(1234)), "1'234.00");
        assert_eq!(format_currency(Decimal::from(1000000)), "1'000'000.00");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(Decimal::from(-20)), "-20.00");
        assert_eq!(format_currency(Decimal::from(-1234)), "-1'234.00");
        assert_eq!(format_currency(Decimal::new(-196, 1)), "-19.60");
    }

    #[test]
    fn test_format_currency_zero() {
        assert_eq!(format_currency(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_format_currency_rounds_decimals() {
        assert_eq!(format_currency(Decimal::new(10099, 2)), "100.99");
        assert_eq!(format_currency(Decimal::new(100999, 3)), "101.00");
        assert_eq!(format_currency(Decimal::new(-100999, 3)), "-101.00");
    }

    #[test]
    fn test_format_decimal_fixed() {
        assert_eq!(format_decimal_fixed(Decimal::new(1234, 2), 2), "12.34");
        assert_eq!(format_decimal_fixed(Decimal::new(1234, 2), 4), "12.3400");
        assert_eq!(format_decimal_fixed(Decimal::new(-56789, 3), 2), "-56.79");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(Decimal::from(100)), "100");
        assert_eq!(format_decimal(Decimal::new(1234, 1)), "123.4");
        assert_eq!(format_decimal(Decimal::new(12300, 2)), "123");
        assert_eq!(format_decimal(Decimal::new(12340, 2)), "123.4");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2018, 8, 28).expect("valid date");
        assert_eq!(format_date(date), "28.08.2018");

        let date = NaiveDate::from_ymd_opt(2024, 1, 5).expect("valid date");
        assert_eq!(format_date(date), "05.01.2024");
    }

    #[test]
    fn test_format_tax_period() {
        assert_eq!(format_tax_period(2023), "2023");
        assert_eq!(format_tax_period(2014), "2014");
    }

    #[test]
    fn test_formatting_policy_swiss_defaults() {
        let policy = FormattingPolicy::swiss();
        assert_eq!(policy.date_format, "%d.%m.%Y");
        assert!(policy.use_thousands_separator);
    }

    #[test]
    fn test_currency_formatter_format_amount_chf() {
        let formatter = CurrencyFormatter::swiss();
        assert_eq!(
            formatter.format_amount(Decimal::new(12345, 2), Currency::CHF),
            "123.45"
        );
    }

    #[test]
    fn test_currency_formatter_format_amount_foreign() {
        let formatter = CurrencyFormatter::swiss();
        assert_eq!(
            formatter.format_amount(Decimal::new(12345, 2), Currency::USD),
            "123.45 USD"
        );
    }

    #[test]
    fn test_currency_formatter_format_unit() {
        let formatter = CurrencyFormatter::swiss();
        assert_eq!(
            formatter.format_unit(Decimal::new(46702, 4), Currency::USD),
            "4.6702 USD"
        );
    }
}
