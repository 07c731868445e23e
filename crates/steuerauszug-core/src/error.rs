use thiserror::Error;

/// Hard failures the calculation engine cannot recover from: all of these
/// abort the run the node was found in, as opposed to a [`crate::model::CalculationError`]
/// or [`crate::model::CriticalWarning`], which are collected and reported
/// alongside a completed run.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("security {identifier}: no currency set, cannot resolve an exchange rate")]
    MissingCurrency { identifier: String },

    #[error("security {identifier}: payment on {date} has no exchange rate and currency {currency} is not CHF")]
    MissingExchangeRate {
        identifier: String,
        date: chrono::NaiveDate,
        currency: String,
    },

    #[error("security {identifier}: payment on {date} has sign {sign:?}, which is not in the known set")]
    UnknownPaymentSign {
        identifier: String,
        date: chrono::NaiveDate,
        sign: String,
    },

    #[error("security {identifier}: payment on {date} has sign (V), which has no defined treatment")]
    UnimplementedSign {
        identifier: String,
        date: chrono::NaiveDate,
    },

    #[error("security {identifier}: payment on {date} has neither paymentValue nor paymentValueCHF")]
    MissingPaymentValue {
        identifier: String,
        date: chrono::NaiveDate,
    },

    #[error(
        "security {identifier}: stock split on {date} expected a quantity delta of {expected}, found {actual}"
    )]
    StockSplitMismatch {
        identifier: String,
        date: chrono::NaiveDate,
        expected: rust_decimal::Decimal,
        actual: rust_decimal::Decimal,
    },

    #[error("security {identifier}: split on {date} references new valor {new_valor}, which could not be resolved among known securities")]
    UnresolvedSplitTarget {
        identifier: String,
        date: chrono::NaiveDate,
        new_valor: String,
    },

    #[error("security {identifier}: reconciled balance at {date} is negative ({quantity})")]
    NegativeReconciledQuantity {
        identifier: String,
        date: chrono::NaiveDate,
        quantity: rust_decimal::Decimal,
    },

    #[error("security {identifier}: position reconciliation at {date} failed: {reason}")]
    ReconciliationFailed {
        identifier: String,
        date: chrono::NaiveDate,
        reason: String,
    },

    #[error("security {identifier}: Kursliste payment on {date} has no paymentValueCHF")]
    MissingPaymentValueChf {
        identifier: String,
        date: chrono::NaiveDate,
    },

    #[error("security {identifier}: payment carries non-zero revenue but the security has no country, cannot classify as A or B")]
    MissingSecurityCountry { identifier: String },

    #[error("security {identifier}: ISIN {isin:?} does not match the expected format")]
    InvalidIsin { identifier: String, isin: String },

    #[error("security {identifier}: valor number {valor_number:?} is not a positive integer <= 99,999,999")]
    InvalidValorNumber {
        identifier: String,
        valor_number: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
