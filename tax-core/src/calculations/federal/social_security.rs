//! Taxable portion of Social Security benefits (Pub. 915 worksheet).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::calculations::common::{non_negative, round_to_cents};
use crate::models::{FilingStatus, SocialSecurityParameters};

/// Returns the taxable amount of `benefits`, rounded to cents.
///
/// `other_income` is every other item of gross income less adjustments
/// (before any Social Security is included); `tax_exempt_interest` is added
/// back to form provisional income.
pub fn taxable_benefits(
    params: &SocialSecurityParameters,
    status: FilingStatus,
    benefits: Decimal,
    other_income: Decimal,
    tax_exempt_interest: Decimal,
) -> Decimal {
    if benefits <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let half_benefits = benefits * dec!(0.5);
    let provisional = other_income + tax_exempt_interest + half_benefits;
    let base = *params.base_amount.get(status);
    let adjusted_base = *params.adjusted_base_amount.get(status);

    if provisional <= base {
        return Decimal::ZERO;
    }

    let above_base = provisional - base;
    let band = adjusted_base - base;
    let above_adjusted = non_negative(above_base - band);

    let lower_tier = (above_base.min(band) * params.lower_inclusion_rate).min(half_benefits);
    let upper_tier = above_adjusted * params.upper_inclusion_rate;
    let cap = benefits * params.upper_inclusion_rate;
    let taxable = round_to_cents((lower_tier + upper_tier).min(cap));

    debug!(
        provisional = %provisional,
        taxable = %taxable,
        "taxable social security"
    );
    taxable
}
