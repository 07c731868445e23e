use super::common::{QuotationType, UnknownAttrs};
use super::kursliste::PaymentTypeEstv;
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// `securityName` is truncated to this many characters, with a middle
/// ellipsis, before it is ever written to a statement.
const MAX_SECURITY_NAME_LEN: usize = 60;

/// Sentinel used where the price list has no quote and no reconstructible
/// balance exists yet; distinct from `Some(Decimal::ZERO)`, which means a
/// position was actually closed out.
pub const UNINITIALIZED_QUANTITY: Option<Decimal> = None;

/// A single stock-movement entry: either a balance snapshot
/// (`mutation == false`) or a quantity-changing event such as a buy, sell,
/// or corporate action (`mutation == true`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SecurityStock {
    pub reference_date: NaiveDate,
    pub mutation: bool,
    pub quantity: Decimal,
    pub balance_currency: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

/// A payment (dividend, interest, capital repayment, ...) attributed to a
/// security, either synthesized from the Kursliste or carried over from
/// the broker's own statement.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SecurityPayment {
    pub payment_date: NaiveDate,
    pub ex_date: Option<NaiveDate>,
    pub quantity: Decimal,
    pub amount_currency: Option<String>,
    pub amount_per_unit: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
    pub gross_revenue_a: Option<Decimal>,
    pub gross_revenue_b: Option<Decimal>,
    pub with_holding_tax_claim: Option<Decimal>,
    pub lump_sum_tax_credit: Option<Decimal>,
    pub non_recoverable_tax_amount: Option<Decimal>,
    pub additional_with_holding_tax_usa: Option<Decimal>,
    pub gross_revenue_da1: Option<Decimal>,
    pub tax_value_da1: Option<Decimal>,
    /// Raw ESTV payment sign, e.g. `"(R)"`, `"KEP"`. Known/taxable signs
    /// are validated against the closed set used by the Kursliste payment
    /// synthesizer.
    pub sign: Option<String>,
    /// `true` for a payment whose amounts were never established (the
    /// Kursliste's `undefined` flag), kept as a shell entry for the
    /// broker to fill in manually.
    pub undefined: bool,
    /// `true` when this payment was synthesized by
    /// [`crate::calculator::KurslisteTaxValueCalculator`] from the ESTV
    /// price list rather than carried over from the broker's own
    /// statement. Gates [`crate::calculator::FillInTaxValueCalculator`],
    /// which only ever touches payments with `kursliste == false`.
    pub kursliste: bool,
    /// The Kursliste's own classification of the payment, preserved
    /// verbatim alongside the `(D)`/`(R)`/... sign derived from it.
    pub payment_type_original: Option<PaymentTypeEstv>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

/// One security holding within a depot: identifying data, a year-end tax
/// value, the stock ledger, and the payments attributed to it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Security {
    pub isin: Option<String>,
    pub valor_number: Option<String>,
    pub security_name: String,
    pub security_category: Option<String>,
    pub currency: Option<String>,
    pub quotation_type: QuotationType,
    pub country: Option<String>,
    /// Marks a rights issue: when set, a missing Kursliste entry is not
    /// reported as a critical warning if the closing quantity is zero.
    /// A pragmatic filter carried from the source system, not a tax rule.
    pub is_rights_issue: bool,
    pub tax_value_reference_date: Option<NaiveDate>,
    pub tax_value_quantity: Option<Decimal>,
    pub tax_value_balance_currency: Option<String>,
    pub tax_value_value: Option<Decimal>,
    pub tax_value_value_chf: Option<Decimal>,
    pub stock: Vec<SecurityStock>,
    pub payment: Vec<SecurityPayment>,
    #[serde(flatten)]
    pub unknown: UnknownAttrs,
}

impl Security {
    /// The key the Kursliste and prior-period matching use to identify a
    /// security: the ISIN when present, else the valor number.
    pub fn identifier(&self) -> Option<&str> {
        self.isin.as_deref().or(self.valor_number.as_deref())
    }

    /// Checks the ISIN and valor number invariants eCH-0196 requires.
    /// `securityName`'s length invariant is enforced separately by
    /// [`truncate_security_name`], since it's a transformation rather
    /// than a rejectable condition.
    pub fn validate(&self) -> Result<(), CoreError> {
        let identifier = self.identifier().unwrap_or("<unknown>").to_string();
        if let Some(isin) = &self.isin
            && !validate_isin(isin)
        {
            return Err(CoreError::InvalidIsin {
                identifier,
                isin: isin.clone(),
            });
        }
        if let Some(valor) = &self.valor_number
            && !validate_valor_number(valor)
        {
            return Err(CoreError::InvalidValorNumber {
                identifier,
                valor_number: valor.clone(),
            });
        }
        Ok(())
    }
}

/// Checks the ISIN format eCH-0196 requires: two uppercase letters, nine
/// uppercase alphanumerics, and a single trailing check digit.
pub fn validate_isin(isin: &str) -> bool {
    let bytes = isin.as_bytes();
    if bytes.len() != 12 {
        return false;
    }
    let is_upper_alnum = |b: u8| b.is_ascii_uppercase() || b.is_ascii_digit();
    bytes[0].is_ascii_uppercase()
        && bytes[1].is_ascii_uppercase()
        && bytes[2..11].iter().all(|&b| is_upper_alnum(b))
        && bytes[11].is_ascii_digit()
}

/// Checks `valorNumber`'s range: a positive integer no greater than
/// 99,999,999.
pub fn validate_valor_number(valor_number: &str) -> bool {
    match valor_number.parse::<u64>() {
        Ok(n) => n > 0 && n <= 99_999_999,
        Err(_) => false,
    }
}

/// Truncates `name` to 60 characters with a middle ellipsis, leaving it
/// untouched when it already fits.
pub fn truncate_security_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= MAX_SECURITY_NAME_LEN {
        return name.to_string();
    }
    let budget = MAX_SECURITY_NAME_LEN - 1;
    let head = budget.div_ceil(2);
    let tail = budget - head;
    let mut result: String = chars[..head].iter().collect();
    result.push('…');
    result.extend(&chars[chars.len() - tail..]);
    result
}

/// The three revenue buckets a security's total-value contribution is
/// sorted into, resolved from the payments actually present on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub enum SecurityType {
    /// Ordinary revenue subject to the 35% withholding tax claim.
    A,
    /// Revenue not subject to withholding tax (e.g. a Swiss issuer with
    /// no recorded revenue at all).
    B,
    /// Foreign-source revenue with a DA-1 lump-sum or non-recoverable
    /// component.
    Da1,
}

/// Classify a security by walking its payments: DA-1 wins if any payment
/// carries a non-recoverable or USA-withholding component; otherwise A if
/// any payment has ordinary gross revenue, or the issuer is Swiss with no
/// revenue recorded at all; otherwise B.
pub fn determine_security_type(security: &Security) -> SecurityType {
    let has_da1 = security.payment.iter().any(|p| {
        p.non_recoverable_tax_amount.unwrap_or(Decimal::ZERO) > Decimal::ZERO
            || p.additional_with_holding_tax_usa.unwrap_or(Decimal::ZERO) > Decimal::ZERO
    });
    if has_da1 {
        return SecurityType::Da1;
    }

    let has_revenue_a = security
        .payment
        .iter()
        .any(|p| p.gross_revenue_a.unwrap_or(Decimal::ZERO) > Decimal::ZERO);
    let is_swiss_with_no_revenue = security.country.as_deref() == Some("CH")
        && security.payment.iter().all(|p| {
            p.gross_revenue_a.unwrap_or(Decimal::ZERO) == Decimal::ZERO
                && p.gross_revenue_b.unwrap_or(Decimal::ZERO) == Decimal::ZERO
        });

    if has_revenue_a || is_swiss_with_no_revenue {
        SecurityType::A
    } else {
        SecurityType::B
    }
}
