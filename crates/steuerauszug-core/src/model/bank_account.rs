use super::common::UnknownAttrs;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A single interest or fee payment booked on a bank account.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BankAccountPayment {
    pub payment_date: NaiveDate,
    pub amount_currency: Option<String>,
    pub amount: Option<Decimal>,
    /// Set when the account's issuer country is `CH`; mutually exclusive
    /// with `gross_revenue_b`.
    pub gross_revenue_a: Option<Decimal>,
    pub gross_revenue_b: Option<Decimal>,
    /// 35% of `gross_revenue_a`, HALF-UP to 2dp. Only ever set alongside
    /// `gross_revenue_a`.
    pub with_holding_tax_claim: Option<Decimal>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

/// The year-end balance snapshot for a bank account, valued in CHF.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct BankAccountTaxValue {
    pub reference_date: NaiveDate,
    pub balance_currency: Option<String>,
    pub balance: Option<Decimal>,
    pub value: Option<Decimal>,
    pub value_chf: Option<Decimal>,
}

/// A bank (cash) account within a depot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BankAccount {
    pub bank_account_number: String,
    pub bank_account_name: Option<String>,
    pub bank_account_currency: Option<String>,
    /// Issuer/domicile country; `CH` classifies the account's payments as
    /// revenue bucket A (subject to the 35% withholding claim).
    pub country: Option<String>,
    pub tax_value: Option<BankAccountTaxValue>,
    pub payment: Vec<BankAccountPayment>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}
