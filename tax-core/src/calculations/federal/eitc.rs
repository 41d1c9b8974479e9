//! Earned income tax credit.
//!
//! The credit is a three-segment function of income: it phases in linearly
//! up to the plateau, holds at the maximum, then phases out linearly to zero.
//! The segment constants depend on the number of qualifying children
//! (0, 1, 2, 3 or more).

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{non_negative, round_to_cents};
use crate::models::{Dependent, EitcParameters, EitcSchedule, FilingStatus, TaxpayerInfo};

/// Everything the EITC depends on besides the taxpayer record.
#[derive(Debug, Clone, Copy)]
pub struct EitcInput {
    pub earned_income: Decimal,
    pub agi: Decimal,
    pub investment_income: Decimal,
}

/// A dependent is a qualifying child when under the age limit, under the
/// student age limit while a full-time student, or permanently disabled.
pub fn is_qualifying_child(
    params: &EitcParameters,
    dependent: &Dependent,
) -> bool {
    dependent.age < params.qualifying_child_age_limit
        || (dependent.is_student && dependent.age < params.student_age_limit)
        || dependent.is_disabled
}

/// The credit for `income` on one schedule, unrounded.
pub fn credit_at(
    schedule: &EitcSchedule,
    status: FilingStatus,
    income: Decimal,
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let phase_in = (income * schedule.phase_in_rate).min(schedule.max_credit);
    let phase_out_start = schedule.phase_out_start_for(status);
    if income <= phase_out_start {
        return phase_in;
    }
    non_negative(schedule.max_credit - (income - phase_out_start) * schedule.phase_out_rate)
        .min(phase_in)
}

/// The allowed credit, rounded to cents.
pub fn calculate(
    params: &EitcParameters,
    taxpayer: &TaxpayerInfo,
    input: &EitcInput,
) -> Decimal {
    let status = taxpayer.filing_status;
    if status == FilingStatus::MarriedFilingSeparately {
        return Decimal::ZERO;
    }
    if input.earned_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if input.investment_income > params.investment_income_limit {
        warn!(
            investment_income = %input.investment_income,
            limit = %params.investment_income_limit,
            "investment income exceeds EITC limit; credit disallowed"
        );
        return Decimal::ZERO;
    }

    let children = taxpayer
        .dependents
        .iter()
        .filter(|d| is_qualifying_child(params, d))
        .count();

    if children == 0 {
        let in_range = |age: Option<u32>| {
            age.is_none_or(|a| (params.childless_min_age..=params.childless_max_age).contains(&a))
        };
        if !taxpayer.filer_ages().into_iter().any(in_range) {
            debug!("no filer within the childless EITC age range");
            return Decimal::ZERO;
        }
    }

    let schedule = params.schedule_for(children);
    let mut credit = credit_at(schedule, status, input.earned_income);
    if input.agi > schedule.phase_out_start_for(status) {
        credit = credit.min(credit_at(schedule, status, input.agi));
    }

    let credit = round_to_cents(credit);
    debug!(children, credit = %credit, "earned income credit");
    credit
}
