use super::bank_account::BankAccount;
use super::common::UnknownAttrs;
use super::liability_account::LiabilityAccount;
use super::security::Security;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A deductible expense entry (e.g. custody fees). `TotalCalculator` walks
/// these but they never contribute to any total: eCH-0196 carries them for
/// disclosure only.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Expense {
    pub name: String,
    pub amount_currency: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

/// The securities held in a depot, plus the running year-end balance
/// that anchors the position reconciliation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ListOfSecurities {
    pub security: Vec<Security>,
}

/// One custody depot: its securities, cash accounts, and liabilities.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Depot {
    pub depot_number: String,
    pub depot_name: Option<String>,
    pub list_of_securities: ListOfSecurities,
    pub list_of_bank_accounts: Vec<BankAccount>,
    pub list_of_liabilities: Vec<LiabilityAccount>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

/// The full tax statement for a tax period: one or more depots, expenses,
/// and the aggregated totals `TotalCalculator` fills in.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TaxStatement {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub canton: Option<String>,
    pub list_of_depots: Vec<Depot>,
    pub list_of_expenses: Vec<Expense>,

    pub total_tax_value: Option<Decimal>,
    pub total_gross_revenue_a: Option<Decimal>,
    pub total_gross_revenue_b: Option<Decimal>,
    pub total_with_holding_tax_claim: Option<Decimal>,
    pub total_gross_revenue_da1: Option<Decimal>,
    pub total_tax_value_da1: Option<Decimal>,
    pub total_flat_rate_tax_credit: Option<Decimal>,
    pub total_additional_with_holding_tax_usa: Option<Decimal>,

    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

impl TaxStatement {
    pub fn securities(&self) -> impl Iterator<Item = &Security> {
        self.list_of_depots
            .iter()
            .flat_map(|depot| depot.list_of_securities.security.iter())
    }

    pub fn securities_mut(&mut self) -> impl Iterator<Item = &mut Security> {
        self.list_of_depots
            .iter_mut()
            .flat_map(|depot| depot.list_of_securities.security.iter_mut())
    }
}
