use crate::model::{CriticalWarning, CriticalWarningCategory, Security, TaxStatement};
use crate::ordering::sort_security_stocks;
use rust_decimal::Decimal;

/// A security whose opening position this year disagrees with its closing
/// position in the prior statement.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMismatch {
    pub depot_number: String,
    pub identifier: String,
    pub prior_ending_quantity: Decimal,
    pub current_opening_quantity: Decimal,
}

/// A security the prior statement closed with a non-zero position that
/// cannot be found at all in the current statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingSecurity {
    pub depot_number: String,
    pub identifier: String,
    pub prior_ending_quantity: Decimal,
}

/// A security present in the current statement with a non-zero opening
/// position that cannot be found at all in the prior statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingInPriorSecurity {
    pub depot_number: String,
    pub identifier: String,
    pub current_opening_quantity: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct PriorPeriodVerificationResult {
    pub mismatches: Vec<PositionMismatch>,
    pub missing: Vec<MissingSecurity>,
    pub missing_in_prior: Vec<MissingInPriorSecurity>,
    pub matched_count: usize,
    pub warnings: Vec<CriticalWarning>,
}

/// Checks continuity between two consecutive tax statements: every
/// security the prior statement closed a position in should open the
/// current year at the same quantity. Parsing the prior period's own XML
/// is out of scope here — the caller supplies an already-parsed
/// [`TaxStatement`].
pub struct PriorPeriodVerifier;

impl PriorPeriodVerifier {
    /// The key securities are matched on across periods: the ISIN when
    /// present, else the valor number. A security with neither cannot be
    /// matched and is skipped with a warning rather than compared.
    fn match_key<'a>(depot_number: &'a str, security: &'a Security) -> Option<(&'a str, &'a str)> {
        security.identifier().map(|id| (depot_number, id))
    }

    fn opening_quantity(security: &Security) -> Decimal {
        let mut stocks = security.stock.clone();
        sort_security_stocks(&mut stocks);
        stocks
            .iter()
            .find(|s| !s.mutation)
            .map(|s| s.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn verify(current: &TaxStatement, prior: &TaxStatement) -> PriorPeriodVerificationResult {
        let mut result = PriorPeriodVerificationResult::default();

        let current_by_key: Vec<((&str, &str), &Security)> = current
            .list_of_depots
            .iter()
            .flat_map(|depot| {
                depot
                    .list_of_securities
                    .security
                    .iter()
                    .filter_map(move |s| Self::match_key(&depot.depot_number, s).map(|key| (key, s)))
            })
            .collect();

        let mut prior_keys: std::collections::HashSet<(String, String)> = std::collections::HashSet::new();

        for depot in &prior.list_of_depots {
            for prior_security in &depot.list_of_securities.security {
                let Some(key) = Self::match_key(&depot.depot_number, prior_security) else {
                    result.warnings.push(CriticalWarning {
                        category: CriticalWarningCategory::UnmatchedPriorPeriodSecurity,
                        message: "prior-period security has neither ISIN nor valor number".to_string(),
                        identifier: None,
                    });
                    continue;
                };
                prior_keys.insert((key.0.to_string(), key.1.to_string()));
                let identifier = key.1;
                let prior_ending = prior_security.tax_value_quantity.unwrap_or(Decimal::ZERO);

                match current_by_key.iter().find(|(k, _)| *k == key) {
                    None => {
                        if prior_ending != Decimal::ZERO {
                            result.missing.push(MissingSecurity {
                                depot_number: depot.depot_number.clone(),
                                identifier: identifier.to_string(),
                                prior_ending_quantity: prior_ending,
                            });
                        }
                    }
                    Some((_, current_security)) => {
                        let opening = Self::opening_quantity(current_security);

                        if opening == prior_ending {
                            result.matched_count += 1;
                        } else {
                            result.mismatches.push(PositionMismatch {
                                depot_number: depot.depot_number.clone(),
                                identifier: identifier.to_string(),
                                prior_ending_quantity: prior_ending,
                                current_opening_quantity: opening,
                            });
                        }
                    }
                }
            }
        }

        for (key, current_security) in &current_by_key {
            if prior_keys.contains(&(key.0.to_string(), key.1.to_string())) {
                continue;
            }
            let opening = Self::opening_quantity(current_security);
            if opening != Decimal::ZERO {
                result.missing_in_prior.push(MissingInPriorSecurity {
                    depot_number: key.0.to_string(),
                    identifier: key.1.to_string(),
                    current_opening_quantity: opening,
                });
            }
        }

        result
    }
}
