use crate::model::SecurityStock;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Compare two stock entries by reference date, then balance-before-mutation
/// (`mutation == false` sorts first on a tied date): a position's opening
/// balance on a given day is always seen before that day's transactions.
pub fn compare_stock_entries(left: &SecurityStock, right: &SecurityStock) -> Ordering {
    left.reference_date
        .cmp(&right.reference_date)
        .then_with(|| left.mutation.cmp(&right.mutation))
}

/// Sort a security's stock ledger in place by `(referenceDate, mutation)`,
/// the order the position reconciler and the prior-period verifier both
/// assume.
pub fn sort_security_stocks(stocks: &mut [SecurityStock]) {
    stocks.sort_by(compare_stock_entries);
}

/// Compare records by date, then ticker. Kept for the Kursliste payment
/// synthesizer, which orders a security's payments this way before
/// reconciling positions against them.
pub fn compare_date_ticker(
    left_date: NaiveDate,
    left_ticker: &str,
    right_date: NaiveDate,
    right_ticker: &str,
) -> Ordering {
    left_date
        .cmp(&right_date)
        .then_with(|| left_ticker.cmp(right_ticker))
}
