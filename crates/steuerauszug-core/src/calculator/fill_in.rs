use super::kursliste::KurslisteTaxValueCalculator;
use super::RunResult;
use crate::accessor::{ExchangeRateProvider, FlagOverrideProvider, KurslisteAccessor};
use crate::error::CoreError;
use crate::model::{Security, TaxStatement};
use rust_decimal::Decimal;

/// Runs after the Kursliste pass and handles its residue: a broker
/// reported a payment that has no Kursliste counterpart (an obscure
/// distribution, or a security the price list doesn't carry at all).
/// For each such payment still carrying an unconverted amount, convert it
/// to CHF and classify it into revenue bucket A or B by the security's
/// issuer country. A payment [`KurslisteTaxValueCalculator`] already
/// synthesized (`payment.kursliste == true`) is left untouched.
pub struct FillInTaxValueCalculator<'a, R: ExchangeRateProvider, K: KurslisteAccessor, F: FlagOverrideProvider> {
    pub inner: KurslisteTaxValueCalculator<'a, R, K, F>,
}

impl<'a, R: ExchangeRateProvider, K: KurslisteAccessor, F: FlagOverrideProvider> FillInTaxValueCalculator<'a, R, K, F> {
    pub fn run(&self, statement: &mut TaxStatement) -> Result<RunResult, CoreError> {
        let mut result = self.inner.run(statement)?;
        for depot in &mut statement.list_of_depots {
            for security in &mut depot.list_of_securities.security {
                self.fill_residual_payments(security, &mut result)?;
            }
        }
        Ok(result)
    }

    fn fill_residual_payments(&self, security: &mut Security, result: &mut RunResult) -> Result<(), CoreError> {
        let identifier = security.identifier().unwrap_or("<unknown>").to_string();
        let country = security.country.clone();

        for payment in &mut security.payment {
            if payment.kursliste {
                continue;
            }
            let (Some(currency), Some(amount)) = (payment.amount_currency.clone(), payment.amount) else {
                continue;
            };

            let rate = self
                .inner
                .inner
                .exchange_rate(&identifier, &currency, payment.payment_date)?;
            let chf_amount = amount * rate;
            payment.exchange_rate = Some(rate);

            match country.as_deref() {
                Some("CH") => {
                    payment.gross_revenue_a = Some(chf_amount);
                    payment.gross_revenue_b = Some(Decimal::ZERO);
                }
                Some(_) => {
                    payment.gross_revenue_a = Some(Decimal::ZERO);
                    payment.gross_revenue_b = Some(chf_amount);
                }
                None if chf_amount.is_zero() => {}
                None => {
                    return Err(CoreError::MissingSecurityCountry { identifier: identifier.clone() });
                }
            }
            result.modified_paths.push(format!(
                "security[{identifier}].payment[{}].grossRevenue",
                payment.payment_date
            ));
        }
        Ok(())
    }
}
