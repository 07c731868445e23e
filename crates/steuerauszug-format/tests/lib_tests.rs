//! Tests for steuerauszug-format's lib.rs (currency and date formatting)

#![allow(clippy::expect_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use steuerauszug_format::{
    format_currency, format_date, format_decimal, format_decimal_fixed, format_tax_period,
    CurrencyFormatter,
};
use steuerauszug_money::Currency;

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
fn test_currency_formatter_format_unit_trims_zeros() {
    let formatter = CurrencyFormatter::swiss();
    assert_eq!(
        formatter.format_unit(Decimal::new(12500, 2), Currency::USD),
        "125 USD"
    );
}
