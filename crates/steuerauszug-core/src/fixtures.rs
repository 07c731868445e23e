//! Reference in-memory implementations of the accessor traits, useful for
//! tests and for small runs that don't need a real Kursliste source.

use crate::accessor::{ExchangeRateProvider, FlagOverrideProvider, KurslisteAccessor};
use crate::model::{Da1Rate, KlSecurity};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// An in-memory Kursliste keyed by ISIN and valor number, for tests and
/// small standalone runs.
#[derive(Debug, Default)]
pub struct InMemoryKurslisteAccessor {
    by_isin: HashMap<String, KlSecurity>,
    by_valor: HashMap<String, String>,
    da1_rates: Vec<Da1Rate>,
}

impl InMemoryKurslisteAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_security(&mut self, security: KlSecurity) {
        if let Some(isin) = security.isin.clone() {
            self.by_valor
                .insert(security.valor_number.clone(), isin.clone());
            self.by_isin.insert(isin, security);
        } else {
            self.by_valor
                .insert(security.valor_number.clone(), security.valor_number.clone());
            self.by_isin.insert(security.valor_number.clone(), security);
        }
    }

    pub fn insert_da1_rate(&mut self, rate: Da1Rate) {
        self.da1_rates.push(rate);
    }
}

impl KurslisteAccessor for InMemoryKurslisteAccessor {
    fn security(&self, isin: Option<&str>, valor_number: Option<&str>, _year: i32) -> Option<&KlSecurity> {
        if let Some(isin) = isin
            && let Some(security) = self.by_isin.get(isin)
        {
            return Some(security);
        }
        valor_number.and_then(|valor| self.security_by_valor(valor, _year))
    }

    fn security_by_valor(&self, valor_number: &str, _year: i32) -> Option<&KlSecurity> {
        let isin = self.by_valor.get(valor_number)?;
        self.by_isin.get(isin)
    }

    fn da1_rate(
        &self,
        country: &str,
        security_group: &str,
        security_type: Option<&str>,
        date: NaiveDate,
    ) -> Option<&Da1Rate> {
        let same_group = || {
            self.da1_rates
                .iter()
                .filter(|rate| rate.country == country && rate.security_group == security_group)
        };
        let prefers_type = security_type.is_some_and(|t| same_group().any(|rate| rate.security_type.as_deref() == Some(t)));
        same_group()
            .filter(|rate| {
                if prefers_type {
                    rate.security_type.as_deref() == security_type
                } else {
                    rate.security_type.is_none()
                }
            })
            .find(|rate| rate.valid_from <= date && date <= rate.valid_to)
    }
}

/// An exchange-rate provider backed by a flat map of `(currency, date)`
/// pairs; CHF is not looked up here since `payment.exchangeRate` and the
/// CHF-is-always-1 shortcut handle that upstream.
#[derive(Debug, Default)]
pub struct MapExchangeRateProvider {
    rates: HashMap<(String, NaiveDate), Decimal>,
}

impl MapExchangeRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, currency: impl Into<String>, date: NaiveDate, rate: Decimal) {
        self.rates.insert((currency.into(), date), rate);
    }
}

impl ExchangeRateProvider for MapExchangeRateProvider {
    fn exchange_rate(&self, currency: &str, date: NaiveDate) -> Option<Decimal> {
        self.rates.get(&(currency.to_string(), date)).copied()
    }
}

/// A flag-override provider backed by a flat map, for tests that need to
/// exercise the override path without a real source of manual corrections.
#[derive(Debug, Default)]
pub struct MapFlagOverrideProvider {
    overrides: HashMap<(String, NaiveDate), String>,
}

impl MapFlagOverrideProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, date: NaiveDate, sign: impl Into<String>) {
        self.overrides.insert((identifier.into(), date), sign.into());
    }
}

impl FlagOverrideProvider for MapFlagOverrideProvider {
    fn sign_override(&self, identifier: &str, date: NaiveDate) -> Option<String> {
        self.overrides.get(&(identifier.to_string(), date)).cloned()
    }
}
