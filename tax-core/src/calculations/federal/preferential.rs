//! Qualified dividends and capital gain tax worksheet.
//!
//! Preferential income (qualified dividends plus net capital gain) sits on top
//! of ordinary income. The slice of it that falls below the 0% threshold is
//! untaxed, the slice below the 15% threshold is taxed at 15%, and the rest at
//! 20%. The same split is reused by the AMT with its own ordinary-rate
//! function.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::non_negative;
use crate::models::{BracketSchedule, CapitalGainsParameters, FilingStatus};

/// How preferential income divides across the three capital-gain rates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferentialSplit {
    pub ordinary_income: Decimal,
    pub at_zero_rate: Decimal,
    pub at_fifteen_rate: Decimal,
    pub at_twenty_rate: Decimal,
}

impl PreferentialSplit {
    /// Splits `preferential` (already limited to `total`) stacked above the
    /// ordinary portion of `total`.
    pub fn new(
        params: &CapitalGainsParameters,
        status: FilingStatus,
        total: Decimal,
        preferential: Decimal,
    ) -> Self {
        let total = non_negative(total);
        let preferential = non_negative(preferential).min(total);
        let ordinary_income = total - preferential;

        let zero_max = *params.zero_rate_max.get(status);
        let fifteen_max = *params.fifteen_rate_max.get(status);

        let at_zero_rate = non_negative(total.min(zero_max) - ordinary_income).min(preferential);
        let remaining = preferential - at_zero_rate;
        let at_fifteen_rate = non_negative(total.min(fifteen_max) - (ordinary_income + at_zero_rate))
            .min(remaining);
        let at_twenty_rate = remaining - at_fifteen_rate;

        Self {
            ordinary_income,
            at_zero_rate,
            at_fifteen_rate,
            at_twenty_rate,
        }
    }

    /// Tax on the preferential slices only.
    pub fn preferential_tax(
        &self,
        params: &CapitalGainsParameters,
    ) -> Decimal {
        self.at_zero_rate * params.zero_rate
            + self.at_fifteen_rate * params.fifteen_rate
            + self.at_twenty_rate * params.twenty_rate
    }
}

/// Net capital gain eligible for preferential rates: the smaller of the net
/// long-term gain and the overall net gain, never negative.
pub fn net_capital_gain(
    short_term: Decimal,
    long_term: Decimal,
) -> Decimal {
    non_negative(long_term.min(short_term + long_term))
}

/// Regular income tax, unrounded.
///
/// The smaller of the schedule tax on all of `taxable_income` and the
/// schedule tax on the ordinary portion plus the preferential-rate tax.
pub fn regular_tax(
    schedule: &BracketSchedule,
    params: &CapitalGainsParameters,
    status: FilingStatus,
    taxable_income: Decimal,
    preferential: Decimal,
) -> Decimal {
    let all_ordinary = schedule.tax_on(taxable_income);
    if preferential <= Decimal::ZERO {
        return all_ordinary;
    }

    let split = PreferentialSplit::new(params, status, taxable_income, preferential);
    let with_preference = schedule.tax_on(split.ordinary_income) + split.preferential_tax(params);
    all_ordinary.min(with_preference)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FilingStatusTable;

    fn params() -> CapitalGainsParameters {
        CapitalGainsParameters {
            zero_rate_max: FilingStatusTable::federal(
                dec!(48350),
                dec!(96700),
                dec!(48350),
                dec!(64750),
            ),
            fifteen_rate_max: FilingStatusTable::federal(
                dec!(533400),
                dec!(600050),
                dec!(300000),
                dec!(566700),
            ),
            zero_rate: dec!(0),
            fifteen_rate: dec!(0.15),
            twenty_rate: dec!(0.20),
        }
    }

    fn single_2025() -> BracketSchedule {
        BracketSchedule::from_pairs(&[
            (dec!(0), dec!(0.10)),
            (dec!(11925), dec!(0.12)),
            (dec!(48475), dec!(0.22)),
            (dec!(103350), dec!(0.24)),
            (dec!(197300), dec!(0.32)),
            (dec!(250525), dec!(0.35)),
            (dec!(626350), dec!(0.37)),
        ])
        .expect("valid schedule")
    }

    // =========================================================================
    // Split
    // =========================================================================

    #[test]
    fn gain_straddling_zero_threshold_splits() {
        let split = PreferentialSplit::new(&params(), FilingStatus::Single, dec!(60000), dec!(20000));

        assert_eq!(split.ordinary_income, dec!(40000));
        assert_eq!(split.at_zero_rate, dec!(8350));
        assert_eq!(split.at_fifteen_rate, dec!(11650));
        assert_eq!(split.at_twenty_rate, dec!(0));
    }

    #[test]
    fn high_income_gain_falls_in_twenty_percent_band() {
        let split =
            PreferentialSplit::new(&params(), FilingStatus::Single, dec!(600000), dec!(100000));

        assert_eq!(split.at_zero_rate, dec!(0));
        assert_eq!(split.at_fifteen_rate, dec!(33400));
        assert_eq!(split.at_twenty_rate, dec!(66600));
    }

    #[test]
    fn preferential_is_limited_to_total() {
        let split = PreferentialSplit::new(&params(), FilingStatus::Single, dec!(5000), dec!(9000));

        assert_eq!(split.ordinary_income, dec!(0));
        assert_eq!(split.at_zero_rate, dec!(5000));
    }

    // =========================================================================
    // Regular tax
    // =========================================================================

    #[test]
    fn no_preferential_income_uses_schedule() {
        let tax = regular_tax(&single_2025(), &params(), FilingStatus::Single, dec!(85000), dec!(0));

        assert_eq!(tax, dec!(13614.00));
    }

    #[test]
    fn qualified_income_lowers_tax() {
        let tax = regular_tax(
            &single_2025(),
            &params(),
            FilingStatus::Single,
            dec!(60000),
            dec!(20000),
        );

        // ordinary 40,000: 1,192.50 + 28,075 × 12% = 4,561.50
        // 15% on 11,650 = 1,747.50
        assert_eq!(tax, dec!(6309.00));
    }

    #[test]
    fn net_capital_gain_nets_short_term_losses() {
        assert_eq!(net_capital_gain(dec!(-3000), dec!(10000)), dec!(7000));
        assert_eq!(net_capital_gain(dec!(5000), dec!(2000)), dec!(2000));
        assert_eq!(net_capital_gain(dec!(-8000), dec!(2000)), dec!(0));
    }
}
