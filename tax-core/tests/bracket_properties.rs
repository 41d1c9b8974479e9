use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
use rust_decimal::Decimal;
use tax_core::calculations::common::{is_whole_cents, round_to_cents};
use tax_core::{FilingStatus, TaxEngine, TaxReturn, TaxYearConfigStore, TaxpayerInfo};

fn cents(value: u64) -> Decimal {
    Decimal::new(i64::try_from(value).unwrap_or(i64::MAX), 2)
}

fn status(index: usize) -> FilingStatus {
    FilingStatus::ALL[index % FilingStatus::ALL.len()]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn federal_tax_never_decreases_with_income(
        year in 2024i32..=2025,
        status_index in 0usize..5,
        low in 0u64..100_000_000,
        delta in 0u64..50_000_000,
    ) {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");
        let config = store.load(year).expect("registered");
        let schedule = config.brackets.get(status(status_index));

        let lower = schedule.tax_on(cents(low));
        let higher = schedule.tax_on(cents(low + delta));

        prop_assert!(lower <= higher);
    }

    #[test]
    fn federal_tax_is_continuous_at_every_floor(
        year in 2024i32..=2025,
        status_index in 0usize..5,
    ) {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");
        let config = store.load(year).expect("registered");
        let schedule = config.brackets.get(status(status_index));
        let step = Decimal::new(1, 2);

        for bracket in schedule.brackets() {
            let at = schedule.tax_on(bracket.floor);
            let above = schedule.tax_on(bracket.floor + step);
            // One cent more income costs at most one cent at the new rate
            prop_assert_eq!(above - at, step * bracket.rate);
        }
    }

    #[test]
    fn state_schedule_tax_never_decreases_with_income(
        low in 0u64..100_000_000,
        delta in 0u64..50_000_000,
        status_index in 0usize..5,
    ) {
        let engine = TaxEngine::builtin().expect("builtin configuration is valid");
        let status = status(status_index);

        for (code, year) in engine.registry().registered_keys() {
            let calculator = engine.registry().resolve(&code, year).expect("registered");
            let lower = calculator.calculate_brackets(cents(low), status);
            let higher = calculator.calculate_brackets(cents(low + delta), status);
            prop_assert!(lower <= higher, "{}", code);
        }
    }

    #[test]
    fn totals_equal_sum_of_rounded_lines(
        wages in 0u64..50_000_000,
        interest in 0u64..2_000_000,
        withholding in 0u64..10_000_000,
        status_index in 0usize..5,
    ) {
        let engine = TaxEngine::builtin().expect("builtin configuration is valid");
        let mut tax_return = TaxReturn::new(2025, TaxpayerInfo::new(status(status_index), "VA"));
        tax_return.income.wages = cents(wages);
        tax_return.income.taxable_interest = cents(interest);
        tax_return.income.federal_withholding = cents(withholding);

        let computed = engine
            .calculate(&tax_return)
            .expect("calculation succeeds")
            .computed
            .expect("results attached");
        let federal = &computed.federal;

        for (name, value) in federal.monetary_fields() {
            prop_assert!(is_whole_cents(value), "{} = {}", name, value);
        }
        prop_assert_eq!(round_to_cents(federal.total_tax), federal.total_tax);
        prop_assert_eq!(
            federal.total_payments,
            federal.withholding + federal.estimated_payments + federal.credits.total_refundable
        );
        prop_assert_eq!(federal.refund_or_owed, federal.total_payments - federal.total_tax);
        prop_assert_eq!(
            computed.state.refund_or_owed,
            computed.state.withholding + computed.state.refundable_credits
                - computed.state.liability
        );
    }
}
