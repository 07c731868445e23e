//! The tax-statement tree: the data the calculation engine reads and
//! mutates in place.
//!
//! Every entity here corresponds to an eCH-0196 element. The core never
//! parses or serializes XML itself (that is an external collaborator's
//! job); it only walks and fills in this tree.

mod bank_account;
mod common;
mod kursliste;
mod liability_account;
mod security;
mod tax_statement;
mod warnings;

pub use bank_account::{BankAccount, BankAccountPayment, BankAccountTaxValue};
pub use common::{QuotationType, UnknownAttrs};
pub use kursliste::{
    Da1Rate, KlLegend, KlPayment, KlSecurity, PaymentTypeEstv, SECURITY_GROUP_SHARE,
};
pub use liability_account::{LiabilityAccount, LiabilityAccountPayment, LiabilityAccountTaxValue};
pub use security::{
    Security, SecurityPayment, SecurityStock, SecurityType, UNINITIALIZED_QUANTITY,
    determine_security_type, truncate_security_name, validate_isin, validate_valor_number,
};
pub use tax_statement::{Depot, Expense, ListOfSecurities, TaxStatement};
pub use warnings::{CalculationError, CriticalWarning, CriticalWarningCategory};
