use rust_decimal::{Decimal, RoundingStrategy};

/// Round `value` half-up (away from zero on ties) to `dp` decimal places.
///
/// All engine arithmetic on individual values stays unrounded; this helper
/// is only ever applied at the sum boundaries `TotalCalculator` computes.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Apply the eCH-0196 / DIN 1333 rounding rule for a summed value: three
/// decimal places when the magnitude is below 100, two decimal places
/// otherwise.
pub fn din1333_round_sum(value: Decimal) -> Decimal {
    let dp = if value.abs() < Decimal::from(100) { 3 } else { 2 };
    round_half_up(value, dp)
}
