use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::calculations::common::is_whole_cents;
use tax_core::{
    AccountType, CalculationError, ComputedReturn, Dependent, FilingStatus, SecurityTransaction,
    TaxEngine, TaxReturn, TaxpayerInfo,
};

fn engine() -> TaxEngine {
    TaxEngine::builtin().expect("builtin configuration is valid")
}

fn new_return(
    status: FilingStatus,
    state: &str,
) -> TaxReturn {
    TaxReturn::new(2025, TaxpayerInfo::new(status, state))
}

fn computed(tax_return: &TaxReturn) -> ComputedReturn {
    engine()
        .calculate(tax_return)
        .expect("calculation succeeds")
        .computed
        .expect("results attached")
}

fn date(
    year: i32,
    month: u32,
    day: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn lot(
    id: &str,
    acquired: NaiveDate,
    sold: Option<NaiveDate>,
    proceeds: Decimal,
    basis: Decimal,
    account_type: AccountType,
) -> SecurityTransaction {
    SecurityTransaction {
        id: id.to_string(),
        ticker: "VTI".to_string(),
        description: String::new(),
        date_acquired: acquired,
        date_sold: sold,
        proceeds,
        cost_basis: basis,
        shares: dec!(40),
        account_type,
    }
}

/// A long-held lot sold at a 2,000 loss on 2025-03-01.
fn loss_sale() -> SecurityTransaction {
    lot(
        "A",
        date(2024, 1, 10),
        Some(date(2025, 3, 1)),
        dec!(8000),
        dec!(10000),
        AccountType::Taxable,
    )
}

// =============================================================================
// Federal
// =============================================================================

#[test]
fn single_wage_earner_in_state_without_income_tax() {
    let mut tax_return = new_return(FilingStatus::Single, "TX");
    tax_return.income.wages = dec!(100750);
    tax_return.income.federal_withholding = dec!(14000);

    let result = computed(&tax_return);

    assert_eq!(result.federal.adjusted_gross_income, dec!(100750));
    assert_eq!(result.federal.taxable_income, dec!(85000));
    assert_eq!(result.federal.regular_tax, dec!(13614.00));
    assert_eq!(result.federal.refund_or_owed, dec!(386.00));
    assert_eq!(result.state.liability, dec!(0));
}

#[test]
fn low_income_family_receives_refundable_credits() {
    let mut tax_return = new_return(FilingStatus::HeadOfHousehold, "FL");
    tax_return.income.wages = dec!(25000);
    tax_return.taxpayer.dependents = vec![Dependent::child("Ana", 5), Dependent::child("Ben", 8)];

    let result = computed(&tax_return);

    assert_eq!(result.federal.credits.additional_child_tax_credit, dec!(3375.00));
    assert_eq!(result.federal.credits.earned_income_credit, dec!(6804.51));
    assert!(result.federal.refund_or_owed > Decimal::ZERO);
}

#[test]
fn every_line_item_is_whole_cents() {
    let mut tax_return = new_return(FilingStatus::MarriedFilingJointly, "NY");
    tax_return.taxpayer.city = Some("Brooklyn".to_string());
    tax_return.income.wages = dec!(187333.33);
    tax_return.income.taxable_interest = dec!(1234.567);
    tax_return.income.ordinary_dividends = dec!(4321.111);
    tax_return.income.qualified_dividends = dec!(3000.005);
    tax_return.income.self_employment_income = dec!(15555.555);
    tax_return.taxpayer.dependents = vec![Dependent::child("Cy", 3)];

    let result = computed(&tax_return);

    for (name, value) in result.federal.monetary_fields() {
        assert!(is_whole_cents(value), "federal {name} = {value}");
    }
    for (name, value) in result.state.monetary_fields() {
        assert!(is_whole_cents(value), "state {name} = {value}");
    }
}

#[test]
fn failure_leaves_input_untouched() {
    let mut tax_return = new_return(FilingStatus::Single, "CA");
    tax_return.income.wages = dec!(-1);

    let result = engine().calculate(&tax_return);

    assert!(matches!(
        result,
        Err(CalculationError::InvalidInput { ref field, .. }) if field == "income.wages"
    ));
    assert!(tax_return.computed.is_none());
}

// =============================================================================
// Wash sales
// =============================================================================

#[test]
fn replacement_ten_days_later_disallows_loss_and_carries_basis() {
    let mut tax_return = new_return(FilingStatus::Single, "TX");
    tax_return.income.wages = dec!(60000);
    tax_return.income.security_transactions = vec![
        loss_sale(),
        lot(
            "B",
            date(2025, 3, 11),
            Some(date(2025, 6, 1)),
            dec!(9000),
            dec!(8100),
            AccountType::Taxable,
        ),
    ];

    let result = computed(&tax_return);

    assert_eq!(result.wash_sales.len(), 1);
    assert_eq!(result.wash_sales[0].sale_id, "A");
    assert_eq!(result.wash_sales[0].info.disallowed_loss, dec!(2000));
    assert!(!result.wash_sales[0].info.is_permanent_disallowance);

    let gains = &result.federal.capital_gains;
    assert_eq!(gains.disallowed_wash_sale_loss, dec!(2000));
    // B: 9,000 − (8,100 + 2,000), long-term through A's tacked holding period
    assert_eq!(gains.long_term_gain, dec!(-1100));
    assert_eq!(gains.short_term_gain, dec!(0));
}

#[test]
fn replacement_forty_five_days_later_is_not_a_wash_sale() {
    let mut tax_return = new_return(FilingStatus::Single, "TX");
    tax_return.income.wages = dec!(60000);
    tax_return.income.security_transactions = vec![
        loss_sale(),
        lot(
            "B",
            date(2025, 4, 15),
            Some(date(2025, 6, 1)),
            dec!(9000),
            dec!(8100),
            AccountType::Taxable,
        ),
    ];

    let result = computed(&tax_return);

    assert!(result.wash_sales.is_empty());
    assert_eq!(result.federal.capital_gains.long_term_gain, dec!(-2000));
    assert_eq!(result.federal.capital_gains.short_term_gain, dec!(900));
}

#[test]
fn ira_replacement_disallows_loss_permanently() {
    let mut tax_return = new_return(FilingStatus::Single, "TX");
    tax_return.income.wages = dec!(60000);
    tax_return.income.security_transactions = vec![
        loss_sale(),
        lot("IRA-1", date(2025, 3, 11), None, dec!(0), dec!(8100), AccountType::Ira),
    ];

    let result = computed(&tax_return);

    assert_eq!(result.wash_sales.len(), 1);
    assert!(result.wash_sales[0].info.is_permanent_disallowance);
    assert_eq!(result.wash_sales[0].info.replacement_account_type, AccountType::Ira);
    assert_eq!(result.federal.capital_gains.included_in_income, dec!(0));
}

#[test]
fn detect_wash_sales_matches_attached_results() {
    let engine = engine();
    let mut tax_return = new_return(FilingStatus::Single, "TX");
    tax_return.income.security_transactions = vec![
        loss_sale(),
        lot("B", date(2025, 2, 20), None, dec!(0), dec!(8000), AccountType::Taxable),
    ];

    let detected = engine.detect_wash_sales(&tax_return);
    let attached = engine
        .calculate(&tax_return)
        .expect("calculation succeeds")
        .computed
        .expect("results attached")
        .wash_sales;

    assert_eq!(detected, attached);
    assert_eq!(detected[0].info.replacement_id, "B");
}

#[test]
fn replacement_sold_before_the_loss_keeps_the_loss() {
    let mut tax_return = new_return(FilingStatus::Single, "TX");
    tax_return.income.wages = dec!(60000);
    tax_return.income.security_transactions = vec![
        lot(
            "B",
            date(2025, 2, 20),
            Some(date(2025, 2, 25)),
            dec!(8100),
            dec!(8000),
            AccountType::Taxable,
        ),
        loss_sale(),
    ];

    let result = computed(&tax_return);

    assert_eq!(result.wash_sales.len(), 1);
    assert!(!result.wash_sales[0].info.is_permanent_disallowance);
    let gains = &result.federal.capital_gains;
    assert_eq!(gains.disallowed_wash_sale_loss, dec!(2000));
    // B: 8,100 − (8,000 + 2,000), long-term through A's tacked holding period
    assert_eq!(gains.net_gain, dec!(-1900));
    assert_eq!(gains.long_term_gain, dec!(-1900));
    assert_eq!(gains.included_in_income, dec!(-1900));
}

#[test]
fn sales_from_other_years_are_not_taxed() {
    let mut tax_return = new_return(FilingStatus::Single, "TX");
    tax_return.income.wages = dec!(50000);
    tax_return.income.security_transactions = vec![
        lot(
            "2023",
            date(2021, 1, 4),
            Some(date(2023, 6, 1)),
            dec!(20000),
            dec!(10000),
            AccountType::Taxable,
        ),
        lot(
            "2026",
            date(2024, 1, 4),
            Some(date(2026, 6, 1)),
            dec!(15000),
            dec!(10000),
            AccountType::Taxable,
        ),
    ];

    let result = computed(&tax_return);

    assert_eq!(result.federal.capital_gains.included_in_income, dec!(0));
    assert_eq!(result.federal.capital_gains.long_term_gain, dec!(0));
    assert_eq!(result.federal.adjusted_gross_income, dec!(50000));
}

// =============================================================================
// Facade
// =============================================================================

#[test]
fn engine_can_be_shared_across_threads() {
    let engine = std::sync::Arc::new(engine());
    let handles: Vec<_> = ["CA", "NY", "TX", "PA"]
        .into_iter()
        .map(|state| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let mut tax_return = new_return(FilingStatus::Single, state);
                tax_return.income.wages = dec!(90000);
                engine.calculate(&tax_return).map(|r| r.computed.is_some())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread completes"), Ok(true));
    }
}
