use super::common::UnknownAttrs;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A single interest charge booked on a liability (debt) account.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiabilityAccountPayment {
    pub payment_date: NaiveDate,
    pub amount_currency: Option<String>,
    pub amount: Option<Decimal>,
    /// Liability interest is always revenue bucket B.
    pub gross_revenue_b: Option<Decimal>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

/// The year-end balance snapshot for a liability account, valued in CHF.
/// `value`/`value_chf` are negative: liabilities reduce the total.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct LiabilityAccountTaxValue {
    pub reference_date: NaiveDate,
    pub balance_currency: Option<String>,
    pub balance: Option<Decimal>,
    pub value: Option<Decimal>,
    pub value_chf: Option<Decimal>,
}

/// A liability (debt) account within a depot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiabilityAccount {
    pub bank_account_number: String,
    pub bank_account_name: Option<String>,
    pub bank_account_currency: Option<String>,
    pub tax_value: Option<LiabilityAccountTaxValue>,
    pub payment: Vec<LiabilityAccountPayment>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}
