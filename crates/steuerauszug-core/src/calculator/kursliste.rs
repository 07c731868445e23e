use super::minimal::MinimalTaxValueCalculator;
use super::{CalculationMode, RunResult};
use crate::accessor::{ExchangeRateProvider, FlagOverrideProvider, KurslisteAccessor, normalize_sign_override};
use crate::config::Config;
use crate::error::CoreError;
use crate::model::{
    CriticalWarning, CriticalWarningCategory, KlPayment, Security, SecurityPayment, SecurityStock, TaxStatement,
};
use crate::reconciler::PositionReconciler;
use chrono::Datelike;
use rust_decimal::Decimal;

/// Payment signs the synthesizer knows how to turn into revenue entries.
/// Anything outside this set is a hard error: ESTV introduces new signs
/// rarely enough that silently skipping an unrecognized one would hide a
/// real gap in coverage.
const KNOWN_SIGN_TYPES: &[&str] = &[
    "(D)", "(Z)", "(K)", "(R)", "(L)", "(G)", "(A)", "(N)", "(M)", "(F)", "(S)", "(T)", "(U)",
    "(Q)", "(B)", "(KG)", "(KR)", "KEP", "(V)", "(J)",
];

/// Signs that never carry taxable revenue: the payment is skipped entirely
/// once recognized as one of these.
const NON_TAXABLE_SIGNS: &[&str] = &["KEP", "(KG)", "(KR)"];

/// An immutable snapshot of a security's identifying fields, taken before
/// the mutable tree walk begins so that stock-split validation can look
/// up *other* securities by valor number without a second mutable borrow
/// into the same tree.
#[derive(Debug, Clone)]
struct SecuritySnapshot {
    isin: Option<String>,
    valor_number: Option<String>,
}

fn snapshot_securities(statement: &TaxStatement) -> Vec<SecuritySnapshot> {
    statement
        .securities()
        .map(|s| SecuritySnapshot {
            isin: s.isin.clone(),
            valor_number: s.valor_number.clone(),
        })
        .collect()
}

/// Synthesizes security payments from the ESTV Kursliste and converts the
/// result to CHF, building on [`MinimalTaxValueCalculator`] for the
/// currency conversion step.
pub struct KurslisteTaxValueCalculator<'a, R: ExchangeRateProvider, K: KurslisteAccessor, F: FlagOverrideProvider> {
    pub mode: CalculationMode,
    pub inner: MinimalTaxValueCalculator<'a, R>,
    pub kursliste: &'a K,
    pub flags: &'a F,
    pub config: &'a Config,
    pub year: i32,
    /// When overwriting, keep payments the broker statement already
    /// carries alongside the synthesized ones rather than replacing them.
    pub keep_existing_payments: bool,
}

impl<'a, R: ExchangeRateProvider, K: KurslisteAccessor, F: FlagOverrideProvider>
    KurslisteTaxValueCalculator<'a, R, K, F>
{
    pub fn run(&self, statement: &mut TaxStatement) -> Result<RunResult, CoreError> {
        let mut result = self.inner.run(statement)?;
        let snapshot = snapshot_securities(statement);
        for depot in &mut statement.list_of_depots {
            for security in &mut depot.list_of_securities.security {
                self.visit_security(security, &snapshot, &mut result)?;
            }
        }
        Ok(result)
    }

    fn visit_security(
        &self,
        security: &mut Security,
        all_securities: &[SecuritySnapshot],
        result: &mut RunResult,
    ) -> Result<(), CoreError> {
        let Some(kl_security) = self
            .kursliste
            .security(security.isin.as_deref(), security.valor_number.as_deref(), self.year)
        else {
            let is_silenced_rights_issue =
                security.is_rights_issue && security.tax_value_quantity.unwrap_or(Decimal::ZERO).is_zero();
            if is_silenced_rights_issue {
                log::debug!(
                    "no Kursliste entry for rights issue {:?} with zero closing quantity, not warning",
                    security.identifier()
                );
                return Ok(());
            }
            log::warn!(
                "no Kursliste entry for security {:?}, skipping payment synthesis",
                security.identifier()
            );
            result.warnings.push(CriticalWarning {
                category: CriticalWarningCategory::MissingKursliste,
                message: "no Kursliste entry found for security".to_string(),
                identifier: security.identifier().map(str::to_string),
            });
            return Ok(());
        };

        log::debug!("synthesizing Kursliste payments for {:?}", security.identifier());
        let synthesized = self.synthesize_payments(security, kl_security, all_securities, result)?;

        self.set_kursliste_payments(security, synthesized, result);
        Ok(())
    }

    /// Builds the stock used for payment-date reconciliation: the
    /// security's own ledger augmented with its year-end tax value,
    /// converted to a synthetic balance entry.
    fn augmented_stock(&self, security: &Security) -> Vec<SecurityStock> {
        let mut stocks = security.stock.clone();
        if let (Some(reference_date), Some(quantity)) =
            (security.tax_value_reference_date, security.tax_value_quantity)
        {
            stocks.push(SecurityStock {
                reference_date,
                mutation: false,
                quantity,
                balance_currency: security.tax_value_balance_currency.clone(),
                name: None,
                unknown: Default::default(),
            });
        }
        stocks
    }

    /// Mirrors the 15-step per-payment algorithm the ESTV price list
    /// synthesizer runs: skip non-cash events, validate the sign and any
    /// accompanying stock split, resolve CHF amounts and the withholding
    /// claim, and attach a DA-1 credit when the source country requires it.
    fn synthesize_payments(
        &self,
        security: &Security,
        kl_security: &crate::model::KlSecurity,
        all_securities: &[SecuritySnapshot],
        result: &mut RunResult,
    ) -> Result<Vec<SecurityPayment>, CoreError> {
        let identifier = security.identifier().unwrap_or("<unknown>").to_string();
        let mut payments = Vec::new();
        let stocks = self.augmented_stock(security);

        for payment in &kl_security.payments {
            if payment.deleted || payment.capital_gain {
                continue;
            }

            let reconciliation_date = payment.ex_date.unwrap_or(payment.payment_date);
            if let Some(ex_date) = payment.ex_date
                && ex_date.year() < self.year
            {
                result.warnings.push(CriticalWarning {
                    category: CriticalWarningCategory::PreviousYearExDate,
                    message: format!(
                        "ex-date {ex_date} falls in the year before payment date {}",
                        payment.payment_date
                    ),
                    identifier: Some(identifier.clone()),
                });
            }

            let quantity = PositionReconciler::new(
                &identifier,
                &stocks,
                self.config.assume_zero_if_no_balances,
            )
            .reconcile(reconciliation_date)?;
            if quantity.is_zero() {
                continue;
            }

            if !payment.legend.is_empty() {
                self.validate_stock_split(&identifier, security, payment, quantity, all_securities)?;
            }

            let sign = self.resolve_sign(&identifier, payment)?;
            if NON_TAXABLE_SIGNS.contains(&sign.as_str()) {
                continue;
            }
            if sign == "(V)" {
                return Err(CoreError::UnimplementedSign {
                    identifier: identifier.clone(),
                    date: payment.payment_date,
                });
            }

            if payment.undefined {
                payments.push(SecurityPayment {
                    payment_date: payment.payment_date,
                    ex_date: payment.ex_date,
                    quantity,
                    amount_currency: Some(payment.currency.clone()),
                    amount_per_unit: None,
                    amount: None,
                    exchange_rate: None,
                    gross_revenue_a: None,
                    gross_revenue_b: None,
                    with_holding_tax_claim: None,
                    lump_sum_tax_credit: None,
                    non_recoverable_tax_amount: None,
                    additional_with_holding_tax_usa: None,
                    gross_revenue_da1: None,
                    tax_value_da1: None,
                    sign: Some(sign),
                    undefined: true,
                    kursliste: true,
                    payment_type_original: payment.payment_type,
                    unknown: Default::default(),
                });
                continue;
            }

            let amount_per_unit = payment
                .payment_value
                .or(payment.payment_value_chf)
                .ok_or_else(|| CoreError::MissingPaymentValue {
                    identifier: identifier.clone(),
                    date: payment.payment_date,
                })?;
            let amount = amount_per_unit * quantity;

            let exchange_rate = match payment.exchange_rate {
                Some(rate) => rate,
                None if payment.currency == "CHF" => Decimal::ONE,
                None => {
                    return Err(CoreError::MissingExchangeRate {
                        identifier: identifier.clone(),
                        date: payment.payment_date,
                        currency: payment.currency.clone(),
                    });
                }
            };
            let payment_value_chf = payment.payment_value_chf.ok_or_else(|| CoreError::MissingPaymentValueChf {
                identifier: identifier.clone(),
                date: payment.payment_date,
            })?;
            let chf_amount = payment_value_chf * quantity;

            let effective_sign = if let Some(raw_override) = self.flags.sign_override(&identifier, payment.payment_date) {
                normalize_sign_override(&raw_override)
            } else {
                sign.clone()
            };
            let security_group = if effective_sign == "(Q)" {
                crate::model::SECURITY_GROUP_SHARE.to_string()
            } else {
                kl_security.security_group.clone()
            };

            let (gross_revenue_a, gross_revenue_b, with_holding_tax_claim) = if payment.with_holding_tax {
                (
                    Some(chf_amount),
                    Some(Decimal::ZERO),
                    Some(steuerauszug_money::round_half_up(
                        chf_amount * self.config.with_holding_tax_rate,
                        2,
                    )),
                )
            } else {
                (Some(Decimal::ZERO), Some(chf_amount), None)
            };

            let mut lump_sum_tax_credit = None;
            let mut non_recoverable_tax_amount = None;
            let mut additional_with_holding_tax_usa = None;
            if let Some(country) = kl_security.country.as_deref() {
                let security_type = if effective_sign == "(Q)" { None } else { Some(kl_security.security_type.as_str()) };
                if let Some(rate) = self
                    .kursliste
                    .da1_rate(country, &security_group, security_type, payment.payment_date)
                {
                    let lump_sum = steuerauszug_money::round_half_up(chf_amount * rate.lump_sum_rate, 2);
                    let non_recoverable = steuerauszug_money::round_half_up(chf_amount * rate.non_recoverable_rate, 2);
                    if lump_sum > Decimal::ZERO {
                        lump_sum_tax_credit = Some(lump_sum);
                    }
                    if non_recoverable > Decimal::ZERO {
                        non_recoverable_tax_amount = Some(non_recoverable);
                    }
                    if country == "US" {
                        additional_with_holding_tax_usa = Some(Decimal::ZERO);
                    }
                }
            }

            payments.push(SecurityPayment {
                payment_date: payment.payment_date,
                ex_date: payment.ex_date,
                quantity,
                amount_currency: Some(payment.currency.clone()),
                amount_per_unit: Some(amount_per_unit),
                amount: Some(amount),
                exchange_rate: Some(exchange_rate),
                gross_revenue_a,
                gross_revenue_b,
                with_holding_tax_claim,
                lump_sum_tax_credit,
                non_recoverable_tax_amount,
                additional_with_holding_tax_usa,
                gross_revenue_da1: lump_sum_tax_credit,
                tax_value_da1: None,
                sign: Some(effective_sign),
                undefined: false,
                kursliste: true,
                payment_type_original: payment.payment_type,
                unknown: Default::default(),
            });
        }

        Ok(payments)
    }

    fn resolve_sign(&self, identifier: &str, payment: &KlPayment) -> Result<String, CoreError> {
        let sign = normalize_sign_override(&payment.sign);
        if !KNOWN_SIGN_TYPES.contains(&sign.as_str()) {
            return Err(CoreError::UnknownPaymentSign {
                identifier: identifier.to_string(),
                date: payment.payment_date,
                sign,
            });
        }
        Ok(sign)
    }

    /// Checks a stock split's recorded quantity delta against the legend's
    /// exchange ratio, either on the same security or, when the legend
    /// names a different valor, on whichever security in the snapshot (or
    /// the Kursliste-resolved ISIN of that valor) matches.
    fn validate_stock_split(
        &self,
        identifier: &str,
        security: &Security,
        payment: &KlPayment,
        quantity_at_reconciliation: Decimal,
        all_securities: &[SecuritySnapshot],
    ) -> Result<(), CoreError> {
        let Some(legend) = payment.legend.first() else {
            return Ok(());
        };
        let ratio = legend.exchange_ratio_new / legend.exchange_ratio_present;

        // the quantity delta the mutation entries dated on the payment day
        // actually recorded, which the broker statement is expected to
        // have booked alongside the corporate action.
        let recorded_delta: Decimal = security
            .stock
            .iter()
            .filter(|s| s.mutation && s.reference_date == payment.payment_date)
            .map(|s| s.quantity)
            .sum();

        match &legend.valor_number_new {
            None => {
                let expected = quantity_at_reconciliation * (ratio - Decimal::ONE);
                if recorded_delta != expected {
                    return Err(CoreError::StockSplitMismatch {
                        identifier: identifier.to_string(),
                        date: payment.payment_date,
                        expected,
                        actual: recorded_delta,
                    });
                }
            }
            Some(new_valor) => {
                let expected = -quantity_at_reconciliation;
                if recorded_delta != expected {
                    return Err(CoreError::StockSplitMismatch {
                        identifier: identifier.to_string(),
                        date: payment.payment_date,
                        expected,
                        actual: recorded_delta,
                    });
                }
                let resolved = all_securities
                    .iter()
                    .any(|s| s.valor_number.as_deref() == Some(new_valor.as_str()))
                    || self.kursliste.security_by_valor(new_valor, self.year).is_some();
                if !resolved {
                    return Err(CoreError::UnresolvedSplitTarget {
                        identifier: identifier.to_string(),
                        date: payment.payment_date,
                        new_valor: new_valor.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The mode-aware bridge between synthesized payments and whatever the
    /// security already carries: Overwrite replaces (merging when
    /// `keep_existing_payments` is set), Fill replaces only an empty list,
    /// and Verify (or Fill against a non-empty list) compares pairwise by
    /// date and reports mismatches as field errors.
    fn set_kursliste_payments(&self, security: &mut Security, synthesized: Vec<SecurityPayment>, result: &mut RunResult) {
        let identifier = security.identifier().unwrap_or("<unknown>").to_string();
        match self.mode {
            CalculationMode::Overwrite => {
                if self.keep_existing_payments {
                    let mut merged = security.payment.clone();
                    merged.extend(synthesized);
                    security.payment = merged;
                } else {
                    security.payment = synthesized;
                }
                result.modified_paths.push(format!("security[{identifier}].payment"));
            }
            CalculationMode::Fill if security.payment.is_empty() => {
                security.payment = synthesized;
                result.modified_paths.push(format!("security[{identifier}].payment"));
            }
            CalculationMode::Fill | CalculationMode::Verify => {
                self.compare_payments(&identifier, &synthesized, &security.payment, result);
            }
        }
    }

    fn compare_payments(
        &self,
        identifier: &str,
        synthesized: &[SecurityPayment],
        existing: &[SecurityPayment],
        result: &mut RunResult,
    ) {
        for expected in synthesized {
            match existing.iter().find(|p| p.payment_date == expected.payment_date) {
                Some(actual) if actual == expected => {}
                Some(actual) => result.errors.push(crate::model::CalculationError::new(
                    format!("security[{identifier}].payment[{}]", expected.payment_date),
                    expected,
                    actual,
                )),
                None => result.errors.push(crate::model::CalculationError::new(
                    format!("security[{identifier}].payment[{}]", expected.payment_date),
                    expected,
                    Option::<&SecurityPayment>::None,
                )),
            }
        }
        for actual in existing {
            if !synthesized.iter().any(|p| p.payment_date == actual.payment_date) {
                result.errors.push(crate::model::CalculationError::new(
                    format!("security[{identifier}].payment[{}]", actual.payment_date),
                    Option::<&SecurityPayment>::None,
                    actual,
                ));
            }
        }
    }
}
