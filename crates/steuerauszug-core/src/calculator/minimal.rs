use super::{CalculationMode, RunResult, set_field};
use crate::accessor::ExchangeRateProvider;
use crate::error::CoreError;
use crate::model::{BankAccount, BankAccountPayment, LiabilityAccount, LiabilityAccountPayment, Security, TaxStatement};
use rust_decimal::Decimal;
use steuerauszug_money::round_half_up;

/// Fills in (or verifies) the CHF-converted value of every tax-value
/// entry already expressed in its own currency: bank accounts, liability
/// accounts, and securities. This is the bottom of the calculator stack —
/// every higher-level calculator delegates CHF conversion down to it
/// rather than repeating the exchange-rate lookup itself.
pub struct MinimalTaxValueCalculator<'a, R: ExchangeRateProvider> {
    pub mode: CalculationMode,
    pub rates: &'a R,
    pub with_holding_tax_rate: Decimal,
}

impl<'a, R: ExchangeRateProvider> MinimalTaxValueCalculator<'a, R> {
    pub fn new(mode: CalculationMode, rates: &'a R) -> Self {
        Self {
            mode,
            rates,
            with_holding_tax_rate: crate::global_config::get_config().with_holding_tax_rate,
        }
    }

    pub fn with_rate(mode: CalculationMode, rates: &'a R, with_holding_tax_rate: Decimal) -> Self {
        Self { mode, rates, with_holding_tax_rate }
    }

    pub fn run(&self, statement: &mut TaxStatement) -> Result<RunResult, CoreError> {
        let mut result = RunResult::new();
        for depot in &mut statement.list_of_depots {
            for security in &mut depot.list_of_securities.security {
                self.visit_security(security, &mut result)?;
            }
            for account in &mut depot.list_of_bank_accounts {
                self.visit_bank_account(account, &mut result)?;
            }
            for account in &mut depot.list_of_liabilities {
                self.visit_liability_account(account, &mut result)?;
            }
        }
        Ok(result)
    }

    pub(crate) fn exchange_rate(&self, identifier: &str, currency: &str, date: chrono::NaiveDate) -> Result<Decimal, CoreError> {
        if currency == "CHF" {
            return Ok(Decimal::ONE);
        }
        let rate = self.rates.exchange_rate(currency, date).ok_or_else(|| CoreError::MissingExchangeRate {
            identifier: identifier.to_string(),
            date,
            currency: currency.to_string(),
        })?;
        log::trace!("{identifier}: {currency} -> CHF rate {rate} on {date}");
        Ok(rate)
    }

    pub fn visit_security(&self, security: &mut Security, result: &mut RunResult) -> Result<(), CoreError> {
        security.validate()?;
        let identifier = security.identifier().unwrap_or("<unknown>").to_string();

        let truncated_name = crate::model::truncate_security_name(&security.security_name);
        if truncated_name != security.security_name {
            security.security_name = truncated_name;
            result.modified_paths.push(format!("security[{identifier}].securityName"));
        }

        let (Some(value), Some(currency), Some(date)) = (
            security.tax_value_value,
            security.currency.clone(),
            security.tax_value_reference_date,
        ) else {
            return Ok(());
        };
        let rate = self.exchange_rate(&identifier, &currency, date)?;
        set_field(
            self.mode,
            &mut security.tax_value_value_chf,
            value * rate,
            &format!("security[{identifier}].taxValue.valueCHF"),
            result,
        );
        Ok(())
    }

    pub fn visit_bank_account(&self, account: &mut BankAccount, result: &mut RunResult) -> Result<(), CoreError> {
        if let Some(tax_value) = account.tax_value.as_mut()
            && let (Some(value), Some(currency)) = (tax_value.value, tax_value.balance_currency.clone())
        {
            let rate = self.exchange_rate(&account.bank_account_number, &currency, tax_value.reference_date)?;
            set_field(
                self.mode,
                &mut tax_value.value_chf,
                value * rate,
                &format!("bankAccount[{}].taxValue.valueCHF", account.bank_account_number),
                result,
            );
        }

        let is_type_a = account.country.as_deref() == Some("CH");
        for payment in &mut account.payment {
            self.visit_bank_account_payment(&account.bank_account_number, is_type_a, payment, result)?;
        }
        Ok(())
    }

    fn visit_bank_account_payment(
        &self,
        account_number: &str,
        is_type_a: bool,
        payment: &mut BankAccountPayment,
        result: &mut RunResult,
    ) -> Result<(), CoreError> {
        let (Some(amount), Some(currency)) = (payment.amount, payment.amount_currency.clone()) else {
            return Ok(());
        };
        let rate = self.exchange_rate(account_number, &currency, payment.payment_date)?;
        let chf_amount = amount * rate;

        if is_type_a {
            set_field(
                self.mode,
                &mut payment.gross_revenue_a,
                chf_amount,
                &format!("bankAccount[{account_number}].payment[{}].grossRevenueA", payment.payment_date),
                result,
            );
            set_field(
                self.mode,
                &mut payment.with_holding_tax_claim,
                round_half_up(chf_amount * self.with_holding_tax_rate, 2),
                &format!("bankAccount[{account_number}].payment[{}].withHoldingTaxClaim", payment.payment_date),
                result,
            );
        } else {
            set_field(
                self.mode,
                &mut payment.gross_revenue_b,
                chf_amount,
                &format!("bankAccount[{account_number}].payment[{}].grossRevenueB", payment.payment_date),
                result,
            );
        }
        Ok(())
    }

    pub fn visit_liability_account(
        &self,
        account: &mut LiabilityAccount,
        result: &mut RunResult,
    ) -> Result<(), CoreError> {
        if let Some(tax_value) = account.tax_value.as_mut()
            && let (Some(value), Some(currency)) = (tax_value.value, tax_value.balance_currency.clone())
        {
            let rate = self.exchange_rate(&account.bank_account_number, &currency, tax_value.reference_date)?;
            set_field(
                self.mode,
                &mut tax_value.value_chf,
                value * rate,
                &format!("liabilityAccount[{}].taxValue.valueCHF", account.bank_account_number),
                result,
            );
        }

        for payment in &mut account.payment {
            self.visit_liability_account_payment(&account.bank_account_number, payment, result)?;
        }
        Ok(())
    }

    /// Liability interest is always revenue bucket B, never A.
    fn visit_liability_account_payment(
        &self,
        account_number: &str,
        payment: &mut LiabilityAccountPayment,
        result: &mut RunResult,
    ) -> Result<(), CoreError> {
        let (Some(amount), Some(currency)) = (payment.amount, payment.amount_currency.clone()) else {
            return Ok(());
        };
        let rate = self.exchange_rate(account_number, &currency, payment.payment_date)?;
        set_field(
            self.mode,
            &mut payment.gross_revenue_b,
            amount * rate,
            &format!("liabilityAccount[{account_number}].payment[{}].grossRevenueB", payment.payment_date),
            result,
        );
        Ok(())
    }
}
