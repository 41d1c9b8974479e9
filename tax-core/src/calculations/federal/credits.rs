//! Non-refundable and refundable federal credits.
//!
//! Non-refundable credits are applied in a fixed order, each limited to the
//! liability left by the credits before it: child and dependent care,
//! education, foreign tax, other, then the child tax credit together with the
//! credit for other dependents. Refundable credits follow and are not limited.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_to_cents, steps_or_fraction};
use crate::models::{
    ChildTaxCreditParameters, DependentCareParameters, FederalCredits, TaxCredits, TaxYearConfig,
    TaxpayerInfo,
};

/// Figures from earlier steps that the credits depend on.
#[derive(Debug, Clone, Copy)]
pub struct CreditInput {
    pub tax_before_credits: Decimal,
    pub agi: Decimal,
    pub earned_income: Decimal,
    /// Earned income credit, already computed.
    pub earned_income_credit: Decimal,
}

/// Child tax credit and credit for other dependents after the phase-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditAmounts {
    pub qualifying_children: u32,
    pub other_dependents: u32,
    pub phase_out_reduction: Decimal,
    pub total: Decimal,
}

/// Child and dependent care credit, before the liability limit.
///
/// Qualifying expenses are capped per number of qualifying persons and at
/// earned income; the rate steps down one point per $2,000 (or fraction) of
/// AGI above $15,000 until it reaches the floor rate.
pub fn dependent_care_credit(
    params: &DependentCareParameters,
    taxpayer: &TaxpayerInfo,
    expenses: Decimal,
    agi: Decimal,
    earned_income: Decimal,
) -> Decimal {
    let qualifying = taxpayer
        .dependents
        .iter()
        .filter(|d| d.age < params.qualifying_age_limit || d.is_disabled)
        .count();
    if qualifying == 0 || expenses <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let cap = if qualifying == 1 {
        params.max_expenses_one
    } else {
        params.max_expenses_two_or_more
    };
    let allowed = expenses.min(cap).min(non_negative(earned_income));
    let steps = steps_or_fraction(agi - params.phase_down_start, params.phase_down_step);
    let rate = (params.max_rate - steps * params.rate_reduction_per_step).max(params.min_rate);

    round_to_cents(allowed * rate)
}

/// Child tax credit plus credit for other dependents, reduced by $50 for each
/// $1,000 (or fraction) of modified AGI above the threshold.
pub fn child_tax_credit(
    params: &ChildTaxCreditParameters,
    taxpayer: &TaxpayerInfo,
    magi: Decimal,
) -> ChildTaxCreditAmounts {
    let qualifying_children = taxpayer
        .dependents
        .iter()
        .filter(|d| d.age < params.child_age_limit)
        .count() as u32;
    let other_dependents = taxpayer.dependents.len() as u32 - qualifying_children;

    let gross = params.credit_per_child * Decimal::from(qualifying_children)
        + params.other_dependent_credit * Decimal::from(other_dependents);
    let threshold = *params.phase_out_threshold.get(taxpayer.filing_status);
    let phase_out_reduction =
        steps_or_fraction(magi - threshold, params.phase_out_step) * params.phase_out_per_step;

    ChildTaxCreditAmounts {
        qualifying_children,
        other_dependents,
        phase_out_reduction,
        total: round_to_cents(non_negative(gross - phase_out_reduction)),
    }
}

/// Refundable portion of the child tax credit (Schedule 8812).
pub fn additional_child_tax_credit(
    params: &ChildTaxCreditParameters,
    unused_credit: Decimal,
    qualifying_children: u32,
    earned_income: Decimal,
) -> Decimal {
    if qualifying_children == 0 {
        return Decimal::ZERO;
    }
    let per_child_cap = params.refundable_max_per_child * Decimal::from(qualifying_children);
    let earned_portion =
        non_negative(earned_income - params.refundable_earned_income_threshold) * params.refundable_rate;
    round_to_cents(unused_credit.min(per_child_cap).min(earned_portion))
}

/// Limits `credit` to what is left of `remaining`, and reduces it.
///
/// `credit` must already be in cents.
fn take(
    remaining: &mut Decimal,
    credit: Decimal,
) -> Decimal {
    let allowed = non_negative(credit).min(*remaining);
    *remaining -= allowed;
    allowed
}

/// Applies every federal credit.
pub fn apply(
    config: &TaxYearConfig,
    taxpayer: &TaxpayerInfo,
    claimed: &TaxCredits,
    input: &CreditInput,
) -> FederalCredits {
    let mut remaining = input.tax_before_credits;

    let care = dependent_care_credit(
        &config.dependent_care,
        taxpayer,
        claimed.child_care_expenses,
        input.agi,
        input.earned_income,
    );
    let child_and_dependent_care = take(&mut remaining, care);
    let education = take(&mut remaining, round_to_cents(claimed.education_credits));
    let foreign_tax = take(&mut remaining, round_to_cents(claimed.foreign_tax_credit));
    let other_nonrefundable = take(&mut remaining, round_to_cents(claimed.other_nonrefundable));

    let ctc = child_tax_credit(&config.child_tax_credit, taxpayer, input.agi);
    let child_tax_credit = take(&mut remaining, ctc.total);

    let total_nonrefundable =
        child_and_dependent_care + education + foreign_tax + other_nonrefundable + child_tax_credit;

    let additional_child_tax_credit = additional_child_tax_credit(
        &config.child_tax_credit,
        ctc.total - child_tax_credit,
        ctc.qualifying_children,
        input.earned_income,
    );
    let earned_income_credit = input.earned_income_credit;
    let other_refundable = round_to_cents(claimed.other_refundable);
    let total_refundable = additional_child_tax_credit + earned_income_credit + other_refundable;

    debug!(
        total_nonrefundable = %total_nonrefundable,
        total_refundable = %total_refundable,
        "federal credits"
    );

    FederalCredits {
        child_and_dependent_care,
        education,
        foreign_tax,
        other_nonrefundable,
        child_tax_credit,
        total_nonrefundable,
        additional_child_tax_credit,
        earned_income_credit,
        other_refundable,
        total_refundable,
    }
}
