//! Decimal-safe currency support shared by the calculation engine.
//!
//! Provides the ISO currency code type used throughout the tax-statement
//! model, a small exchange-rate cache with the year-end/monthly/daily
//! fallback chain the price list exposes, and the DIN 1333 half-up rounding
//! rule applied at sum boundaries.

mod cache;
mod rounding;

pub use cache::{RateCache, RatePrecision};
pub use iso_currency::Currency;
pub use rounding::{din1333_round_sum, round_half_up};
