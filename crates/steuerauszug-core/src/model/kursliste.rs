use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// `securityGroup` value the ESTV price list uses for plain shares; the
/// `(Q)` sign override forces this group regardless of the security's own
/// classification.
pub const SECURITY_GROUP_SHARE: &str = "SHARE";

/// ESTV's own classification of a payment, as published in the Kursliste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentTypeEstv {
    Standard,
    Gratis,
    OtherBenefit,
    Agio,
    FundAccumulation,
}

/// A stock-split or exchange-ratio legend entry attached to a Kursliste
/// payment, used to validate the quantity delta the broker statement
/// recorded against the corporate action's own ratio.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct KlLegend {
    pub exchange_ratio_present: Decimal,
    pub exchange_ratio_new: Decimal,
    /// Set only when the split exchanges into a different security.
    pub valor_number_new: Option<String>,
}

/// One payment event as published by the Kursliste for a security.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct KlPayment {
    pub payment_date: NaiveDate,
    pub ex_date: Option<NaiveDate>,
    pub currency: String,
    pub payment_value: Option<Decimal>,
    pub payment_value_chf: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
    pub with_holding_tax: bool,
    pub capital_gain: bool,
    pub undefined: bool,
    pub sign: String,
    pub payment_type: Option<PaymentTypeEstv>,
    pub deleted: bool,
    pub legend: Vec<KlLegend>,
}

/// A single security's Kursliste entry: the price list's own
/// classification plus the payments and year-end/daily quotes the
/// accessor exposes through [`crate::accessor::KurslisteAccessor`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct KlSecurity {
    pub valor_number: String,
    pub isin: Option<String>,
    pub security_name: String,
    pub security_group: String,
    pub security_type: String,
    pub country: Option<String>,
    pub currency: String,
    pub year_end_price: Option<Decimal>,
    pub daily_prices: HashMap<NaiveDate, Decimal>,
    pub payments: Vec<KlPayment>,
}

/// A DA-1 lump-sum tax credit rate, keyed by source country and the
/// security's ESTV group/type classification.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct Da1Rate {
    pub country: String,
    pub security_group: String,
    pub security_type: Option<String>,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub lump_sum_rate: Decimal,
    pub non_recoverable_rate: Decimal,
}
