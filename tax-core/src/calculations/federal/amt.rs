//! Alternative minimum tax (Form 6251).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_to_cents};
use crate::calculations::federal::preferential::PreferentialSplit;
use crate::models::{AmtParameters, CapitalGainsParameters, FilingStatus};

/// AMT lines, rounded to cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtResult {
    pub amti: Decimal,
    pub exemption: Decimal,
    pub tentative_minimum_tax: Decimal,
    /// `max(0, tentative minimum tax − regular tax)`.
    pub alternative_minimum_tax: Decimal,
}

/// Inputs gathered by the federal calculator.
#[derive(Debug, Clone, Copy)]
pub struct AmtInput {
    pub status: FilingStatus,
    /// AGI less the deduction taken, before flooring at zero.
    pub income_after_deductions: Decimal,
    /// SALT when itemizing, otherwise the standard deduction.
    pub deduction_add_back: Decimal,
    pub preference_items: Decimal,
    /// Qualified dividends plus net capital gain, taxed at capital-gain rates.
    pub preferential_income: Decimal,
    pub regular_tax: Decimal,
}

/// Exemption after the phase-out: reduced by 25% of AMTI above the
/// threshold, never below zero.
pub fn exemption(
    params: &AmtParameters,
    status: FilingStatus,
    amti: Decimal,
) -> Decimal {
    let base = *params.exemption.get(status);
    let excess = non_negative(amti - *params.phase_out_threshold.get(status));
    non_negative(base - excess * params.phase_out_rate)
}

/// Two-rate AMT on `amount`: low rate up to the breakpoint, high rate above.
fn two_rate_tax(
    params: &AmtParameters,
    status: FilingStatus,
    amount: Decimal,
) -> Decimal {
    let amount = non_negative(amount);
    let breakpoint = *params.rate_breakpoint.get(status);
    if amount <= breakpoint {
        amount * params.low_rate
    } else {
        breakpoint * params.low_rate + (amount - breakpoint) * params.high_rate
    }
}

pub fn calculate(
    params: &AmtParameters,
    capital_gains: &CapitalGainsParameters,
    input: &AmtInput,
) -> AmtResult {
    let status = input.status;
    let amti = round_to_cents(non_negative(
        input.income_after_deductions + input.deduction_add_back + input.preference_items,
    ));
    let exemption = round_to_cents(exemption(params, status, amti));
    let base = non_negative(amti - exemption);

    let all_ordinary = two_rate_tax(params, status, base);
    let tentative = if input.preferential_income > Decimal::ZERO {
        let split = PreferentialSplit::new(capital_gains, status, base, input.preferential_income);
        let with_preference =
            two_rate_tax(params, status, split.ordinary_income) + split.preferential_tax(capital_gains);
        all_ordinary.min(with_preference)
    } else {
        all_ordinary
    };
    let tentative_minimum_tax = round_to_cents(tentative);
    let alternative_minimum_tax = non_negative(tentative_minimum_tax - input.regular_tax);

    debug!(
        amti = %amti,
        exemption = %exemption,
        tentative_minimum_tax = %tentative_minimum_tax,
        alternative_minimum_tax = %alternative_minimum_tax,
        "AMT"
    );

    AmtResult {
        amti,
        exemption,
        tentative_minimum_tax,
        alternative_minimum_tax,
    }
}
