use std::fmt;

/// A discrepancy surfaced by a Verify-mode run: a field the calculator
/// recomputed disagrees with the value already present in the tree.
///
/// `expected` and `actual` are rendered with `Debug` rather than kept as
/// the original typed values, since a single accumulator vector collects
/// mismatches across many unrelated field types during one tree walk.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct CalculationError {
    pub field_path: String,
    pub expected: String,
    pub actual: String,
}

impl CalculationError {
    pub fn new(field_path: impl Into<String>, expected: impl fmt::Debug, actual: impl fmt::Debug) -> Self {
        Self {
            field_path: field_path.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}

impl fmt::Display for CalculationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.field_path, self.expected, self.actual
        )
    }
}

/// A condition worth the user's attention that does not, by itself, make
/// the statement wrong: a previous-year ex-date, a security the price
/// list has no quote for, and so on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct CriticalWarning {
    pub category: CriticalWarningCategory,
    pub message: String,
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CriticalWarningCategory {
    MissingKursliste,
    PreviousYearExDate,
    UnmatchedPriorPeriodSecurity,
}
