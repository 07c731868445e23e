//! The calculator stack: a small set of tree walkers, each wrapping the
//! one beneath it, that fill in or verify a tax statement's computed
//! fields.
//!
//! There is no trait-object dispatch by node kind here — each walker
//! calls the next one's typed hook methods directly, Rust has no use for
//! the visitor double-dispatch trick Python inheritance needs.

mod fill_in;
mod kursliste;
mod minimal;
mod prior_period;
mod total;

pub use fill_in::FillInTaxValueCalculator;
pub use kursliste::KurslisteTaxValueCalculator;
pub use minimal::MinimalTaxValueCalculator;
pub use prior_period::{MissingSecurity, PositionMismatch, PriorPeriodVerificationResult, PriorPeriodVerifier};
pub use total::TotalCalculator;

use crate::model::{CalculationError, CriticalWarning};
use std::fmt::Debug;

/// How a calculator should treat a field that already has a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationMode {
    /// Compute the value and compare it against whatever is already
    /// there, recording a [`CalculationError`] on any mismatch. Never
    /// writes.
    Verify,
    /// Compute the value only when the field is currently empty; leave an
    /// existing value untouched.
    Fill,
    /// Always compute the value and write it, discarding whatever was
    /// there before.
    Overwrite,
}

/// What a calculator run produced, besides the mutations applied directly
/// to the tree: mismatches found in Verify mode, fields actually written,
/// and warnings about conditions worth a human's attention.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub errors: Vec<CalculationError>,
    pub modified_paths: Vec<String>,
    pub warnings: Vec<CriticalWarning>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: RunResult) {
        self.errors.extend(other.errors);
        self.modified_paths.extend(other.modified_paths);
        self.warnings.extend(other.warnings);
    }
}

/// Write (or compare) a single field according to `mode`, the one
/// primitive every calculator hook is built from.
///
/// * `Verify` never writes; a mismatch against `current` is recorded as a
///   [`CalculationError`] at `path`.
/// * `Fill` writes only when `current` is `None`.
/// * `Overwrite` always writes.
pub fn set_field<T>(
    mode: CalculationMode,
    current: &mut Option<T>,
    new_value: T,
    path: &str,
    result: &mut RunResult,
) where
    T: PartialEq + Clone + Debug,
{
    match mode {
        CalculationMode::Verify => {
            if let Some(existing) = current {
                if *existing != new_value {
                    result
                        .errors
                        .push(CalculationError::new(path, new_value, existing.clone()));
                }
            } else {
                result
                    .errors
                    .push(CalculationError::new(path, Some(new_value), Option::<T>::None));
            }
        }
        CalculationMode::Fill => {
            if current.is_none() {
                *current = Some(new_value);
                result.modified_paths.push(path.to_string());
            }
        }
        CalculationMode::Overwrite => {
            *current = Some(new_value);
            result.modified_paths.push(path.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn verify_mode_records_mismatch_without_writing() {
        let mut result = RunResult::new();
        let mut field = Some(dec!(1));
        set_field(CalculationMode::Verify, &mut field, dec!(2), "x", &mut result);
        assert_eq!(field, Some(dec!(1)));
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn verify_mode_passes_on_match() {
        let mut result = RunResult::new();
        let mut field = Some(dec!(2));
        set_field(CalculationMode::Verify, &mut field, dec!(2), "x", &mut result);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn fill_mode_only_writes_when_empty() {
        let mut result = RunResult::new();
        let mut field: Option<rust_decimal::Decimal> = None;
        set_field(CalculationMode::Fill, &mut field, dec!(3), "x", &mut result);
        assert_eq!(field, Some(dec!(3)));

        let mut result = RunResult::new();
        let mut field = Some(dec!(9));
        set_field(CalculationMode::Fill, &mut field, dec!(3), "x", &mut result);
        assert_eq!(field, Some(dec!(9)));
    }

    #[test]
    fn overwrite_mode_always_writes() {
        let mut result = RunResult::new();
        let mut field = Some(dec!(9));
        set_field(CalculationMode::Overwrite, &mut field, dec!(3), "x", &mut result);
        assert_eq!(field, Some(dec!(3)));
    }
}
