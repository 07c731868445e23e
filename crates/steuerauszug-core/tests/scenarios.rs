//! End-to-end scenarios running the full calculator stack against small,
//! hand-built statements, plus a few cross-cutting invariants that hold
//! regardless of which scenario produced the numbers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use steuerauszug_core::accessor::FlagOverrideProvider;
use steuerauszug_core::calculator::{
    CalculationMode, FillInTaxValueCalculator, KurslisteTaxValueCalculator, MinimalTaxValueCalculator,
    TotalCalculator,
};
use steuerauszug_core::config::Config;
use steuerauszug_core::fixtures::{InMemoryKurslisteAccessor, MapExchangeRateProvider, MapFlagOverrideProvider};
use steuerauszug_core::model::{
    BankAccount, BankAccountPayment, BankAccountTaxValue, Da1Rate, Depot, KlLegend, KlPayment, KlSecurity,
    LiabilityAccount, LiabilityAccountPayment, LiabilityAccountTaxValue, ListOfSecurities, QuotationType, Security,
    SecurityStock,
};
use steuerauszug_core::reconciler::PositionReconciler;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn empty_statement(depots: Vec<Depot>) -> steuerauszug_core::model::TaxStatement {
    steuerauszug_core::model::TaxStatement {
        period_from: date("2023-01-01"),
        period_to: date("2023-12-31"),
        canton: None,
        list_of_depots: depots,
        list_of_expenses: Vec::new(),
        total_tax_value: None,
        total_gross_revenue_a: None,
        total_gross_revenue_b: None,
        total_with_holding_tax_claim: None,
        total_gross_revenue_da1: None,
        total_tax_value_da1: None,
        total_flat_rate_tax_credit: None,
        total_additional_with_holding_tax_usa: None,
        unknown: Default::default(),
    }
}

fn depot(number: &str, securities: Vec<Security>, bank_accounts: Vec<BankAccount>) -> Depot {
    Depot {
        depot_number: number.to_string(),
        depot_name: None,
        list_of_securities: ListOfSecurities { security: securities },
        list_of_bank_accounts: bank_accounts,
        list_of_liabilities: Vec::new(),
        unknown: Default::default(),
    }
}

fn bare_security(isin: &str, valor: Option<&str>, country: Option<&str>) -> Security {
    Security {
        isin: Some(isin.to_string()),
        valor_number: valor.map(str::to_string),
        security_name: "Test AG".to_string(),
        security_category: None,
        currency: Some("USD".to_string()),
        quotation_type: QuotationType::Piece,
        country: country.map(str::to_string),
        is_rights_issue: false,
        tax_value_reference_date: Some(date("2023-12-31")),
        tax_value_quantity: None,
        tax_value_balance_currency: None,
        tax_value_value: None,
        tax_value_value_chf: None,
        stock: Vec::new(),
        payment: Vec::new(),
        unknown: Default::default(),
    }
}

// Scenario A: one CH bank account, no payments.
#[test]
fn scenario_a_minimal_chf_bank_account() {
    let mut statement = empty_statement(vec![depot(
        "1",
        Vec::new(),
        vec![BankAccount {
            bank_account_number: "CH-1".to_string(),
            bank_account_name: None,
            bank_account_currency: Some("CHF".to_string()),
            country: Some("CH".to_string()),
            tax_value: Some(BankAccountTaxValue {
                reference_date: date("2023-12-31"),
                balance_currency: Some("CHF".to_string()),
                balance: Some(dec!(1234.56)),
                value: Some(dec!(1234.56)),
                value_chf: None,
            }),
            payment: Vec::new(),
            unknown: Default::default(),
        }],
    )]);

    let rates = MapExchangeRateProvider::new();
    let minimal = MinimalTaxValueCalculator::new(CalculationMode::Fill, &rates);
    minimal.run(&mut statement).expect("fills CHF bank account");

    let total = TotalCalculator { mode: CalculationMode::Fill };
    total.run(&mut statement).expect("fills totals");

    assert_eq!(statement.total_tax_value, Some(dec!(1234.56)));
    assert_eq!(statement.total_gross_revenue_a, Some(Decimal::ZERO));
    assert_eq!(statement.total_gross_revenue_b, Some(Decimal::ZERO));
    assert_eq!(statement.total_with_holding_tax_claim, Some(Decimal::ZERO));
}

// Scenario B: CH savings account with one CHF payment, withholding claim.
#[test]
fn scenario_b_swiss_savings_payment_gets_withholding_claim() {
    let mut statement = empty_statement(vec![depot(
        "1",
        Vec::new(),
        vec![BankAccount {
            bank_account_number: "CH-2".to_string(),
            bank_account_name: None,
            bank_account_currency: Some("CHF".to_string()),
            country: Some("CH".to_string()),
            tax_value: None,
            payment: vec![BankAccountPayment {
                payment_date: date("2023-06-30"),
                amount_currency: Some("CHF".to_string()),
                amount: Some(dec!(100)),
                gross_revenue_a: None,
                gross_revenue_b: None,
                with_holding_tax_claim: None,
                unknown: Default::default(),
            }],
            unknown: Default::default(),
        }],
    )]);

    let rates = MapExchangeRateProvider::new();
    let minimal = MinimalTaxValueCalculator::new(CalculationMode::Fill, &rates);
    minimal.run(&mut statement).expect("fills bank account payment");

    let total = TotalCalculator { mode: CalculationMode::Fill };
    total.run(&mut statement).expect("fills totals");

    let payment = &statement.list_of_depots[0].list_of_bank_accounts[0].payment[0];
    assert_eq!(payment.gross_revenue_a, Some(dec!(100)));
    assert_eq!(payment.gross_revenue_b, None);
    assert_eq!(payment.with_holding_tax_claim, Some(dec!(35.00)));

    assert_eq!(statement.total_gross_revenue_a, Some(dec!(100)));
    assert_eq!(statement.total_gross_revenue_b, Some(Decimal::ZERO));
    assert_eq!(statement.total_with_holding_tax_claim, Some(dec!(35.00)));
}

// Scenario C: US dividend with a DA-1 lump-sum and non-recoverable credit.
#[test]
fn scenario_c_us_dividend_gets_da1_credit() {
    let mut security = bare_security("US0000000001", None, Some("US"));
    security.tax_value_quantity = Some(dec!(20));
    security.stock = vec![SecurityStock {
        reference_date: date("2023-01-01"),
        mutation: false,
        quantity: dec!(20),
        balance_currency: Some("USD".to_string()),
        name: None,
        unknown: Default::default(),
    }];

    let mut statement = empty_statement(vec![depot("1", vec![security], Vec::new())]);

    let mut kursliste = InMemoryKurslisteAccessor::new();
    kursliste.insert_security(KlSecurity {
        valor_number: "1000001".to_string(),
        isin: Some("US0000000001".to_string()),
        security_name: "US Corp".to_string(),
        security_group: "SHARE".to_string(),
        security_type: "1".to_string(),
        country: Some("US".to_string()),
        currency: "USD".to_string(),
        year_end_price: None,
        daily_prices: Default::default(),
        payments: vec![KlPayment {
            payment_date: date("2023-06-30"),
            ex_date: None,
            currency: "USD".to_string(),
            payment_value: Some(dec!(5.00)),
            payment_value_chf: Some(dec!(4.50)),
            exchange_rate: Some(dec!(0.9)),
            with_holding_tax: false,
            capital_gain: false,
            undefined: false,
            sign: "(D)".to_string(),
            payment_type: None,
            deleted: false,
            legend: Vec::new(),
        }],
    });
    kursliste.insert_da1_rate(Da1Rate {
        country: "US".to_string(),
        security_group: "SHARE".to_string(),
        security_type: None,
        valid_from: date("2023-01-01"),
        valid_to: date("2023-12-31"),
        lump_sum_rate: dec!(0.15),
        non_recoverable_rate: dec!(0.15),
    });

    let rates = MapExchangeRateProvider::new();
    let flags = MapFlagOverrideProvider::new();
    let config = Config::embedded();
    let calc = KurslisteTaxValueCalculator {
        mode: CalculationMode::Fill,
        inner: MinimalTaxValueCalculator::new(CalculationMode::Fill, &rates),
        kursliste: &kursliste,
        flags: &flags,
        config: &config,
        year: 2023,
        keep_existing_payments: false,
    };
    let result = calc.run(&mut statement).expect("synthesizes payments");
    assert!(result.warnings.is_empty());

    let payment = &statement.list_of_depots[0].list_of_securities.security[0].payment[0];
    assert_eq!(payment.amount_per_unit, Some(dec!(5.00)));
    assert_eq!(payment.amount, Some(dec!(100.00)));
    assert_eq!(payment.gross_revenue_b, Some(dec!(90.00)));
    assert_eq!(payment.lump_sum_tax_credit, Some(dec!(13.50)));
    assert_eq!(payment.non_recoverable_tax_amount, Some(dec!(13.50)));
    assert_eq!(payment.additional_with_holding_tax_usa, Some(Decimal::ZERO));
}

// Scenario D: a same-ISIN 4:1 split whose recorded delta matches the legend ratio.
#[test]
fn scenario_d_same_isin_split_validates_recorded_delta() {
    let mut security = bare_security("CH0000000002", None, Some("CH"));
    security.tax_value_quantity = Some(dec!(8));
    security.stock = vec![
        SecurityStock {
            reference_date: date("2023-01-01"),
            mutation: false,
            quantity: dec!(2),
            balance_currency: Some("CHF".to_string()),
            name: None,
            unknown: Default::default(),
        },
        SecurityStock {
            reference_date: date("2023-06-30"),
            mutation: true,
            quantity: dec!(6),
            balance_currency: Some("CHF".to_string()),
            name: None,
            unknown: Default::default(),
        },
    ];

    let mut statement = empty_statement(vec![depot("1", vec![security], Vec::new())]);

    let mut kursliste = InMemoryKurslisteAccessor::new();
    kursliste.insert_security(KlSecurity {
        valor_number: "2000002".to_string(),
        isin: Some("CH0000000002".to_string()),
        security_name: "Split AG".to_string(),
        security_group: "SHARE".to_string(),
        security_type: "1".to_string(),
        country: Some("CH".to_string()),
        currency: "CHF".to_string(),
        year_end_price: None,
        daily_prices: Default::default(),
        payments: vec![KlPayment {
            payment_date: date("2023-06-30"),
            ex_date: None,
            currency: "CHF".to_string(),
            payment_value: None,
            payment_value_chf: None,
            exchange_rate: None,
            with_holding_tax: false,
            capital_gain: false,
            undefined: true,
            sign: "(F)".to_string(),
            payment_type: None,
            deleted: false,
            legend: vec![KlLegend {
                exchange_ratio_present: dec!(1),
                exchange_ratio_new: dec!(4),
                valor_number_new: None,
            }],
        }],
    });

    let rates = MapExchangeRateProvider::new();
    let flags = MapFlagOverrideProvider::new();
    let config = Config::embedded();
    let calc = KurslisteTaxValueCalculator {
        mode: CalculationMode::Fill,
        inner: MinimalTaxValueCalculator::new(CalculationMode::Fill, &rates),
        kursliste: &kursliste,
        flags: &flags,
        config: &config,
        year: 2023,
        keep_existing_payments: false,
    };
    let result = calc.run(&mut statement).expect("split validates against its 4:1 ratio");
    assert!(result.warnings.is_empty());

    let payment = &statement.list_of_depots[0].list_of_securities.security[0].payment[0];
    assert_eq!(payment.quantity, dec!(2));
    assert!(payment.undefined);
}

// Scenario E: a cross-ISIN exchange resolved via the legend's valorNumberNew.
#[test]
fn scenario_e_cross_isin_exchange_resolves_target_valor() {
    let mut source = bare_security("CH0000000003", Some("3000003"), Some("CH"));
    source.tax_value_quantity = Some(dec!(0));
    source.stock = vec![
        SecurityStock {
            reference_date: date("2023-01-01"),
            mutation: false,
            quantity: dec!(10),
            balance_currency: Some("CHF".to_string()),
            name: None,
            unknown: Default::default(),
        },
        SecurityStock {
            reference_date: date("2023-08-03"),
            mutation: true,
            quantity: dec!(-10),
            balance_currency: Some("CHF".to_string()),
            name: None,
            unknown: Default::default(),
        },
    ];
    let mut target = bare_security("CH0000000004", Some("4000004"), Some("CH"));
    target.tax_value_quantity = Some(dec!(10));
    target.stock = vec![
        SecurityStock {
            reference_date: date("2023-01-01"),
            mutation: false,
            quantity: dec!(0),
            balance_currency: Some("CHF".to_string()),
            name: None,
            unknown: Default::default(),
        },
        SecurityStock {
            reference_date: date("2023-08-03"),
            mutation: true,
            quantity: dec!(10),
            balance_currency: Some("CHF".to_string()),
            name: None,
            unknown: Default::default(),
        },
    ];

    let mut statement = empty_statement(vec![depot("1", vec![source, target], Vec::new())]);

    let mut kursliste = InMemoryKurslisteAccessor::new();
    kursliste.insert_security(KlSecurity {
        valor_number: "3000003".to_string(),
        isin: Some("CH0000000003".to_string()),
        security_name: "Old AG".to_string(),
        security_group: "SHARE".to_string(),
        security_type: "1".to_string(),
        country: Some("CH".to_string()),
        currency: "CHF".to_string(),
        year_end_price: None,
        daily_prices: Default::default(),
        payments: vec![KlPayment {
            payment_date: date("2023-08-03"),
            ex_date: None,
            currency: "CHF".to_string(),
            payment_value: None,
            payment_value_chf: None,
            exchange_rate: None,
            with_holding_tax: false,
            capital_gain: false,
            undefined: true,
            sign: "(F)".to_string(),
            payment_type: None,
            deleted: false,
            legend: vec![KlLegend {
                exchange_ratio_present: dec!(1),
                exchange_ratio_new: dec!(1),
                valor_number_new: Some("4000004".to_string()),
            }],
        }],
    });

    let rates = MapExchangeRateProvider::new();
    let flags = MapFlagOverrideProvider::new();
    let config = Config::embedded();
    let calc = KurslisteTaxValueCalculator {
        mode: CalculationMode::Fill,
        inner: MinimalTaxValueCalculator::new(CalculationMode::Fill, &rates),
        kursliste: &kursliste,
        flags: &flags,
        config: &config,
        year: 2023,
        keep_existing_payments: false,
    };
    let result = calc.run(&mut statement).expect("exchange resolves against the sibling security");
    assert!(result.warnings.is_empty());

    let payment = &statement.list_of_depots[0].list_of_securities.security[0].payment[0];
    assert_eq!(payment.quantity, dec!(10));
}

// Scenario F: backward position synthesis from a later balance.
#[test]
fn scenario_f_backward_synthesis_yields_expected_quantity() {
    let stocks = vec![
        SecurityStock {
            reference_date: date("2024-01-10"),
            mutation: true,
            quantity: dec!(-2),
            balance_currency: None,
            name: None,
            unknown: Default::default(),
        },
        SecurityStock {
            reference_date: date("2024-02-15"),
            mutation: true,
            quantity: dec!(5),
            balance_currency: None,
            name: None,
            unknown: Default::default(),
        },
        SecurityStock {
            reference_date: date("2024-03-01"),
            mutation: false,
            quantity: dec!(10),
            balance_currency: None,
            name: None,
            unknown: Default::default(),
        },
    ];
    let reconciler = PositionReconciler::new("CH0000000005", &stocks, false);
    let quantity = reconciler.reconcile(date("2024-01-01")).expect("reconciles backward");
    assert_eq!(quantity, dec!(7));
}

// Invariant: an Overwrite pass followed by a Verify pass against the same
// (now-filled) statement reports no mismatches.
#[test]
fn invariant_overwrite_then_verify_round_trips_clean() {
    let mut statement = empty_statement(vec![depot(
        "1",
        Vec::new(),
        vec![BankAccount {
            bank_account_number: "CH-3".to_string(),
            bank_account_name: None,
            bank_account_currency: Some("CHF".to_string()),
            country: Some("CH".to_string()),
            tax_value: Some(BankAccountTaxValue {
                reference_date: date("2023-12-31"),
                balance_currency: Some("CHF".to_string()),
                balance: Some(dec!(800)),
                value: Some(dec!(800)),
                value_chf: None,
            }),
            payment: Vec::new(),
            unknown: Default::default(),
        }],
    )]);

    let rates = MapExchangeRateProvider::new();
    MinimalTaxValueCalculator::new(CalculationMode::Overwrite, &rates)
        .run(&mut statement)
        .expect("overwrite fills CHF value");
    TotalCalculator { mode: CalculationMode::Overwrite }
        .run(&mut statement)
        .expect("overwrite fills totals");

    let verify_minimal = MinimalTaxValueCalculator::new(CalculationMode::Verify, &rates).run(&mut statement).expect("verifies");
    assert!(verify_minimal.is_clean());
    let verify_total = TotalCalculator { mode: CalculationMode::Verify }.run(&mut statement).expect("verifies totals");
    assert!(verify_total.is_clean());
}

// Invariant: TotalCalculator::Fill is idempotent once the totals are set.
#[test]
fn invariant_total_calculator_fill_is_idempotent() {
    let mut statement = empty_statement(vec![depot(
        "1",
        Vec::new(),
        vec![BankAccount {
            bank_account_number: "CH-4".to_string(),
            bank_account_name: None,
            bank_account_currency: Some("CHF".to_string()),
            country: Some("CH".to_string()),
            tax_value: Some(BankAccountTaxValue {
                reference_date: date("2023-12-31"),
                balance_currency: Some("CHF".to_string()),
                balance: Some(dec!(300)),
                value: Some(dec!(300)),
                value_chf: Some(dec!(300)),
            }),
            payment: Vec::new(),
            unknown: Default::default(),
        }],
    )]);

    let total = TotalCalculator { mode: CalculationMode::Fill };
    let first = total.run(&mut statement).expect("first fill");
    assert!(!first.modified_paths.is_empty());
    let second = total.run(&mut statement).expect("second fill is a no-op");
    assert!(second.modified_paths.is_empty());
    assert_eq!(statement.total_tax_value, Some(dec!(300)));
}

// Invariant: liability payments contribute only to grossRevenueB, and a
// liability's negative tax value reduces the statement total.
#[test]
fn invariant_liabilities_contribute_only_to_gross_revenue_b() {
    let mut statement = empty_statement(vec![depot("1", Vec::new(), Vec::new())]);
    statement.list_of_depots[0].list_of_liabilities.push(LiabilityAccount {
        bank_account_number: "LOAN-1".to_string(),
        bank_account_name: None,
        bank_account_currency: Some("CHF".to_string()),
        tax_value: Some(LiabilityAccountTaxValue {
            reference_date: date("2023-12-31"),
            balance_currency: Some("CHF".to_string()),
            balance: Some(dec!(500)),
            value: Some(dec!(500)),
            value_chf: Some(dec!(500)),
        }),
        payment: vec![LiabilityAccountPayment {
            payment_date: date("2023-06-30"),
            amount_currency: Some("CHF".to_string()),
            amount: Some(dec!(20)),
            gross_revenue_b: Some(dec!(20)),
            unknown: Default::default(),
        }],
        unknown: Default::default(),
    });
    statement.list_of_depots[0].list_of_securities.security.push({
        let mut s = bare_security("CH0000000009", None, None);
        s.tax_value_value_chf = Some(dec!(1000));
        s
    });

    let total = TotalCalculator { mode: CalculationMode::Fill };
    total.run(&mut statement).expect("fills totals");

    assert_eq!(statement.total_tax_value, Some(dec!(500)));
    assert_eq!(statement.total_gross_revenue_b, Some(dec!(20)));
    assert_eq!(statement.total_gross_revenue_a, Some(Decimal::ZERO));
}

// Invariant: a rights-issue security with a zero closing quantity and no
// Kursliste entry is silenced rather than reported as a critical warning.
#[test]
fn invariant_rights_issue_with_zero_quantity_is_silenced() {
    let mut security = bare_security("CH0000000006", None, Some("CH"));
    security.is_rights_issue = true;
    security.tax_value_quantity = Some(Decimal::ZERO);

    let mut statement = empty_statement(vec![depot("1", vec![security], Vec::new())]);
    let kursliste = InMemoryKurslisteAccessor::new();
    let rates = MapExchangeRateProvider::new();
    let flags = MapFlagOverrideProvider::new();
    let config = Config::embedded();
    let calc = KurslisteTaxValueCalculator {
        mode: CalculationMode::Fill,
        inner: MinimalTaxValueCalculator::new(CalculationMode::Fill, &rates),
        kursliste: &kursliste,
        flags: &flags,
        config: &config,
        year: 2023,
        keep_existing_payments: false,
    };
    let result = calc.run(&mut statement).expect("runs without error");
    assert!(result.warnings.is_empty());
}

// Exercises FillInTaxValueCalculator's residual-payment handling: a
// security absent from the Kursliste keeps its broker-reported payment,
// which gets converted to CHF and classified by issuer country.
#[test]
fn fill_in_calculator_classifies_residual_broker_payment() {
    use steuerauszug_core::model::SecurityPayment;

    let mut security = bare_security("CH0000000007", None, Some("CH"));
    security.tax_value_quantity = Some(dec!(12));
    security.stock = vec![SecurityStock {
        reference_date: date("2023-01-01"),
        mutation: false,
        quantity: dec!(12),
        balance_currency: Some("CHF".to_string()),
        name: None,
        unknown: Default::default(),
    }];
    security.payment.push(SecurityPayment {
        payment_date: date("2023-06-01"),
        ex_date: None,
        quantity: dec!(12),
        amount_currency: Some("CHF".to_string()),
        amount_per_unit: None,
        amount: Some(dec!(60)),
        exchange_rate: None,
        gross_revenue_a: None,
        gross_revenue_b: None,
        with_holding_tax_claim: None,
        lump_sum_tax_credit: None,
        non_recoverable_tax_amount: None,
        additional_with_holding_tax_usa: None,
        gross_revenue_da1: None,
        tax_value_da1: None,
        sign: None,
        undefined: false,
        kursliste: false,
        payment_type_original: None,
        unknown: Default::default(),
    });

    let mut statement = empty_statement(vec![depot("1", vec![security], Vec::new())]);

    let kursliste = InMemoryKurslisteAccessor::new();
    let rates = MapExchangeRateProvider::new();
    let flags = MapFlagOverrideProvider::new();
    let config = Config::embedded();
    let calc = FillInTaxValueCalculator {
        inner: KurslisteTaxValueCalculator {
            mode: CalculationMode::Fill,
            inner: MinimalTaxValueCalculator::new(CalculationMode::Fill, &rates),
            kursliste: &kursliste,
            flags: &flags,
            config: &config,
            year: 2023,
            keep_existing_payments: true,
        },
    };
    let result = calc.run(&mut statement).expect("warns about the missing Kursliste entry and classifies the residue");
    assert_eq!(result.warnings.len(), 1);

    let payment = &statement.list_of_depots[0].list_of_securities.security[0].payment[0];
    assert_eq!(payment.gross_revenue_a, Some(dec!(60)));
    assert_eq!(payment.gross_revenue_b, Some(Decimal::ZERO));
}

#[test]
fn sign_override_normalizes_bare_letters() {
    let mut flags = MapFlagOverrideProvider::new();
    flags.insert("CH0000000008", date("2023-06-30"), "Q");
    assert_eq!(flags.sign_override("CH0000000008", date("2023-06-30")), Some("Q".to_string()));
}
