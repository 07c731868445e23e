use chrono::{Datelike, NaiveDate};
use iso_currency::Currency;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Granularity at which a rate was recorded, used only to pick the fallback
/// order when several entries could apply to the same lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatePrecision {
    Daily(NaiveDate),
    Monthly { year: i32, month: u32 },
    YearEnd { year: i32 },
}

/// A small exchange-rate store keyed by currency and precision.
///
/// Mirrors the year-end / monthly-average / daily fallback chain the price
/// list's `getExchangeRate` exposes: a lookup for a specific date prefers an
/// exact daily rate, then the monthly average for that month, then the
/// year-end rate.
#[derive(Debug, Default, Clone)]
pub struct RateCache {
    rates: HashMap<(Currency, RatePrecision), Decimal>,
}

impl RateCache {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    pub fn insert(&mut self, currency: Currency, precision: RatePrecision, rate: Decimal) {
        self.rates.insert((currency, precision), rate);
    }

    /// Look up the exchange rate for `currency` on `date`, preferring the
    /// most specific entry available: daily, then monthly, then year-end.
    pub fn lookup(&self, currency: Currency, date: NaiveDate) -> Option<Decimal> {
        if currency == Currency::CHF {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.rates.get(&(currency, RatePrecision::Daily(date))) {
            return Some(*rate);
        }
        if let Some(rate) = self.rates.get(&(
            currency,
            RatePrecision::Monthly {
                year: date.year(),
                month: date.month(),
            },
        )) {
            return Some(*rate);
        }
        self.rates
            .get(&(currency, RatePrecision::YearEnd { year: date.year() }))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
