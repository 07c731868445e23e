use super::{CalculationMode, RunResult, set_field};
use crate::error::CoreError;
use crate::model::{SecurityType, TaxStatement, determine_security_type};
use rust_decimal::Decimal;
use steuerauszug_money::din1333_round_sum;

/// Aggregates the tax statement's nine top-level totals from its depots'
/// securities, bank accounts, and liabilities. `Expense` entries are
/// walked (so a future rule can act on them) but never contribute to any
/// sum: eCH-0196 carries expenses for disclosure only.
pub struct TotalCalculator {
    pub mode: CalculationMode,
}

impl TotalCalculator {
    pub fn run(&self, statement: &mut TaxStatement) -> Result<RunResult, CoreError> {
        let mut result = RunResult::new();

        let mut total_tax_value = Decimal::ZERO;
        let mut total_gross_revenue_a = Decimal::ZERO;
        let mut total_gross_revenue_b = Decimal::ZERO;
        let mut total_with_holding_tax_claim = Decimal::ZERO;
        let mut total_gross_revenue_da1 = Decimal::ZERO;
        let mut total_tax_value_da1 = Decimal::ZERO;
        let mut total_flat_rate_tax_credit = Decimal::ZERO;
        let mut total_additional_with_holding_tax_usa = Decimal::ZERO;

        for depot in &statement.list_of_depots {
            for security in &depot.list_of_securities.security {
                total_tax_value += security.tax_value_value_chf.unwrap_or(Decimal::ZERO);
                if determine_security_type(security) == SecurityType::Da1 {
                    total_tax_value_da1 += security.tax_value_value_chf.unwrap_or(Decimal::ZERO);
                }
                for payment in &security.payment {
                    total_gross_revenue_a += payment.gross_revenue_a.unwrap_or(Decimal::ZERO);
                    total_gross_revenue_b += payment.gross_revenue_b.unwrap_or(Decimal::ZERO);
                    total_with_holding_tax_claim += payment.with_holding_tax_claim.unwrap_or(Decimal::ZERO);
                    total_gross_revenue_da1 += payment.gross_revenue_da1.unwrap_or(Decimal::ZERO);
                    total_flat_rate_tax_credit += payment.lump_sum_tax_credit.unwrap_or(Decimal::ZERO);
                    total_additional_with_holding_tax_usa +=
                        payment.additional_with_holding_tax_usa.unwrap_or(Decimal::ZERO);
                }
            }
            for account in &depot.list_of_bank_accounts {
                if let Some(tax_value) = &account.tax_value {
                    total_tax_value += tax_value.value_chf.unwrap_or(Decimal::ZERO);
                }
                for payment in &account.payment {
                    total_gross_revenue_b += payment.gross_revenue_b.unwrap_or(Decimal::ZERO);
                }
            }
            for account in &depot.list_of_liabilities {
                if let Some(tax_value) = &account.tax_value {
                    // liabilities subtract at statement level but appear
                    // positive in their own list.
                    total_tax_value -= tax_value.value_chf.unwrap_or(Decimal::ZERO);
                }
                for payment in &account.payment {
                    total_gross_revenue_b += payment.gross_revenue_b.unwrap_or(Decimal::ZERO);
                }
            }
        }
        // expenses contribute nothing; the loop is intentionally absent.

        set_field(
            self.mode,
            &mut statement.total_tax_value,
            din1333_round_sum(total_tax_value),
            "totalTaxValue",
            &mut result,
        );
        set_field(
            self.mode,
            &mut statement.total_gross_revenue_a,
            din1333_round_sum(total_gross_revenue_a),
            "totalGrossRevenueA",
            &mut result,
        );
        set_field(
            self.mode,
            &mut statement.total_gross_revenue_b,
            din1333_round_sum(total_gross_revenue_b),
            "totalGrossRevenueB",
            &mut result,
        );
        set_field(
            self.mode,
            &mut statement.total_with_holding_tax_claim,
            din1333_round_sum(total_with_holding_tax_claim),
            "totalWithHoldingTaxClaim",
            &mut result,
        );
        set_field(
            self.mode,
            &mut statement.total_gross_revenue_da1,
            din1333_round_sum(total_gross_revenue_da1),
            "totalGrossRevenueDA1",
            &mut result,
        );
        set_field(
            self.mode,
            &mut statement.total_tax_value_da1,
            din1333_round_sum(total_tax_value_da1),
            "totalTaxValueDA1",
            &mut result,
        );
        set_field(
            self.mode,
            &mut statement.total_flat_rate_tax_credit,
            din1333_round_sum(total_flat_rate_tax_credit),
            "totalFlatRateTaxCredit",
            &mut result,
        );
        set_field(
            self.mode,
            &mut statement.total_additional_with_holding_tax_usa,
            din1333_round_sum(total_additional_with_holding_tax_usa),
            "totalAdditionalWithHoldingTaxUSA",
            &mut result,
        );

        Ok(result)
    }
}
