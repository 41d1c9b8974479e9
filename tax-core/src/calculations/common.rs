//! Money helpers shared by the federal and state calculations.
//!
//! Every line item in a breakdown is finalized exactly once through
//! [`round_to_cents`]. Totals are then formed by adding the already-rounded
//! line items, so a displayed total always equals the sum of the displayed
//! lines.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero). This is
/// not banker's rounding: `0.125` becomes `0.13`, not `0.12`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_to_cents;
///
/// assert_eq!(round_to_cents(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_to_cents(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_to_cents(dec!(0.125)), dec!(0.13));
/// assert_eq!(round_to_cents(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps a value at zero from below.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Number of whole or partial `step`s contained in `amount`.
///
/// Statutory phase-outs are usually worded "for each $1,000 or fraction
/// thereof", so any remainder counts as a full step. Returns zero when
/// `amount` or `step` is not positive.
pub fn steps_or_fraction(
    amount: Decimal,
    step: Decimal,
) -> Decimal {
    if amount <= Decimal::ZERO || step <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (amount / step).ceil()
}

/// Returns true when the value carries no more than two decimal places.
pub fn is_whole_cents(value: Decimal) -> bool {
    value.normalize().scale() <= 2
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_to_cents tests
    // =========================================================================

    #[test]
    fn round_to_cents_rounds_down_below_midpoint() {
        let result = round_to_cents(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_to_cents_rounds_up_at_midpoint() {
        let result = round_to_cents(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_to_cents_is_not_bankers_rounding() {
        assert_eq!(round_to_cents(dec!(0.125)), dec!(0.13));
        assert_eq!(round_to_cents(dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn round_to_cents_handles_negative_values() {
        let result = round_to_cents(dec!(-123.455));

        assert_eq!(result, dec!(-123.46));
    }

    #[test]
    fn round_to_cents_preserves_already_rounded_values() {
        let result = round_to_cents(dec!(123.45));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_to_cents_handles_large_values() {
        let result = round_to_cents(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    // =========================================================================
    // max / non_negative tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
        assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
    }

    #[test]
    fn max_handles_equal_values() {
        assert_eq!(max(dec!(150.00), dec!(150.00)), dec!(150.00));
    }

    #[test]
    fn non_negative_clamps_losses_to_zero() {
        assert_eq!(non_negative(dec!(-0.01)), dec!(0));
        assert_eq!(non_negative(dec!(12.34)), dec!(12.34));
    }

    // =========================================================================
    // steps_or_fraction tests
    // =========================================================================

    #[test]
    fn steps_or_fraction_counts_partial_step_as_whole() {
        assert_eq!(steps_or_fraction(dec!(1000), dec!(1000)), dec!(1));
        assert_eq!(steps_or_fraction(dec!(1000.01), dec!(1000)), dec!(2));
        assert_eq!(steps_or_fraction(dec!(1), dec!(1000)), dec!(1));
    }

    #[test]
    fn steps_or_fraction_is_zero_for_non_positive_amounts() {
        assert_eq!(steps_or_fraction(dec!(0), dec!(1000)), dec!(0));
        assert_eq!(steps_or_fraction(dec!(-5), dec!(1000)), dec!(0));
        assert_eq!(steps_or_fraction(dec!(5), dec!(0)), dec!(0));
    }

    #[test]
    fn is_whole_cents_detects_sub_cent_precision() {
        assert!(is_whole_cents(dec!(10.50)));
        assert!(is_whole_cents(dec!(10.5000)));
        assert!(!is_whole_cents(dec!(10.505)));
    }
}
