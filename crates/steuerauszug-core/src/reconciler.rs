//! Reconstructs a security's quantity on hand at an arbitrary date from
//! its stock ledger: year-end balance snapshots and quantity-changing
//! mutations (buys, sells, corporate actions).
//!
//! A target date's quantity is always the balance at the *start* of that
//! day: mutations dated exactly on the target date are never applied (in
//! the forward direction) or un-applied (in the backward direction).

use crate::error::CoreError;
use crate::model::SecurityStock;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// The stock ledger entries for one security, split and sorted for
/// repeated reconciliation queries against different target dates.
pub struct PositionReconciler<'a> {
    identifier: &'a str,
    stocks: &'a [SecurityStock],
    assume_zero_if_no_balances: bool,
}

impl<'a> PositionReconciler<'a> {
    pub fn new(identifier: &'a str, stocks: &'a [SecurityStock], assume_zero_if_no_balances: bool) -> Self {
        Self {
            identifier,
            stocks,
            assume_zero_if_no_balances,
        }
    }

    fn balances(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.stocks
            .iter()
            .filter(|s| !s.mutation)
            .map(|s| (s.reference_date, s.quantity))
    }

    fn mutations(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.stocks
            .iter()
            .filter(|s| s.mutation)
            .map(|s| (s.reference_date, s.quantity))
    }

    /// Reconstruct the quantity on hand at the start of `target_date`.
    pub fn reconcile(&self, target_date: NaiveDate) -> Result<Decimal, CoreError> {
        let forward_anchor = self
            .balances()
            .filter(|(date, _)| *date <= target_date)
            .max_by_key(|(date, _)| *date);
        let backward_anchor = self
            .balances()
            .filter(|(date, _)| *date > target_date)
            .min_by_key(|(date, _)| *date);

        let quantity = match (forward_anchor, backward_anchor) {
            (Some(forward), _) => self.reconcile_forward(forward, target_date),
            (None, Some(backward)) => self.reconcile_backward(backward, target_date),
            (None, None) if self.assume_zero_if_no_balances => {
                self.reconcile_forward((NaiveDate::MIN, Decimal::ZERO), target_date)
            }
            (None, None) => {
                log::warn!(
                    "{}: no balance entries to reconcile against at {}",
                    self.identifier,
                    target_date
                );
                return Err(CoreError::ReconciliationFailed {
                    identifier: self.identifier.to_string(),
                    date: target_date,
                    reason: "no balance entries to reconcile against".to_string(),
                });
            }
        };

        if quantity < Decimal::ZERO {
            return Err(CoreError::NegativeReconciledQuantity {
                identifier: self.identifier.to_string(),
                date: target_date,
                quantity,
            });
        }
        Ok(quantity)
    }

    fn reconcile_forward(&self, anchor: (NaiveDate, Decimal), target_date: NaiveDate) -> Decimal {
        let (anchor_date, anchor_quantity) = anchor;
        self.mutations()
            .filter(|(date, _)| *date > anchor_date && *date < target_date)
            .fold(anchor_quantity, |quantity, (_, delta)| quantity + delta)
    }

    fn reconcile_backward(&self, anchor: (NaiveDate, Decimal), target_date: NaiveDate) -> Decimal {
        let (anchor_date, anchor_quantity) = anchor;
        self.mutations()
            .filter(|(date, _)| *date > target_date && *date < anchor_date)
            .fold(anchor_quantity, |quantity, (_, delta)| quantity - delta)
    }
}
