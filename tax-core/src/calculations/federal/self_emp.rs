//! Self-employment tax (Schedule SE, short form).
//!
//! | Line | Description |
//! |------|-------------|
//! | 2    | Net profit from self-employment |
//! | 3    | Line 2 × 92.35% (net earnings factor) |
//! | 4    | Medicare tax: Line 3 × 2.9% |
//! | 5    | Maximum earnings subject to social security tax |
//! | 6    | Wages already subject to social security tax |
//! | 7    | Line 5 minus Line 6 (if zero or less, no social security tax) |
//! | 8    | Smaller of Line 3 or Line 7 |
//! | 9    | Social security tax: Line 8 × 12.4% |
//! | 10   | Self-employment tax: Line 4 + Line 9 |
//! | 11   | Deductible part of SE tax: Line 10 × 50% |
//!
//! At or below the minimum threshold ($400) no SE tax is due.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::federal::SeWorksheet;
//! use tax_core::config::TaxYearConfigStore;
//!
//! let store = TaxYearConfigStore::builtin().unwrap();
//! let config = store.load(2025).unwrap();
//!
//! let result = SeWorksheet::new(&config.self_employment).calculate(dec!(100000), dec!(50000));
//!
//! assert_eq!(result.self_employment_tax, dec!(14129.55));
//! assert_eq!(result.se_tax_deduction, dec!(7064.78));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::round_to_cents;
use crate::models::SelfEmploymentParameters;

/// Every line of the SE worksheet, rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeWorksheetResult {
    /// Net profit from self-employment (Line 2).
    pub se_income: Decimal,
    /// Line 3.
    pub net_earnings: Decimal,
    /// Line 4.
    pub medicare_tax: Decimal,
    /// Line 8.
    pub ss_taxable_earnings: Decimal,
    /// Line 9.
    pub social_security_tax: Decimal,
    /// Line 10.
    pub self_employment_tax: Decimal,
    /// Line 11; an above-the-line adjustment on the return.
    pub se_tax_deduction: Decimal,
    /// Income was at or below the minimum threshold, so every tax line is zero.
    pub below_threshold: bool,
}

impl SeWorksheetResult {
    fn below_threshold(se_income: Decimal) -> Self {
        Self {
            se_income,
            net_earnings: Decimal::ZERO,
            medicare_tax: Decimal::ZERO,
            ss_taxable_earnings: Decimal::ZERO,
            social_security_tax: Decimal::ZERO,
            self_employment_tax: Decimal::ZERO,
            se_tax_deduction: Decimal::ZERO,
            below_threshold: true,
        }
    }
}

/// Calculator for the SE worksheet, borrowing the year's parameters.
#[derive(Debug, Clone, Copy)]
pub struct SeWorksheet<'a> {
    params: &'a SelfEmploymentParameters,
}

impl<'a> SeWorksheet<'a> {
    pub fn new(params: &'a SelfEmploymentParameters) -> Self {
        Self { params }
    }

    /// Runs the worksheet.
    ///
    /// * `se_income` - net profit from self-employment (Line 2)
    /// * `wages` - wages subject to social security tax (Line 6)
    pub fn calculate(
        &self,
        se_income: Decimal,
        wages: Decimal,
    ) -> SeWorksheetResult {
        let se_income = round_to_cents(se_income);

        if se_income <= self.params.min_se_threshold {
            if se_income > Decimal::ZERO {
                warn!(
                    se_income = %se_income,
                    threshold = %self.params.min_se_threshold,
                    "SE income at or below minimum threshold; no SE tax due"
                );
            }
            return SeWorksheetResult::below_threshold(se_income);
        }

        // Line 3
        let net_earnings = self.net_earnings(se_income);
        // Line 4
        let medicare_tax = round_to_cents(net_earnings * self.params.medicare_tax_rate);
        // Lines 5-8
        let ss_taxable_earnings = net_earnings.min(self.remaining_ss_wage_base(wages));
        // Line 9
        let social_security_tax = round_to_cents(ss_taxable_earnings * self.params.ss_tax_rate);
        // Line 10
        let self_employment_tax = medicare_tax + social_security_tax;
        // Line 11
        let se_tax_deduction = round_to_cents(self_employment_tax * self.params.deduction_factor);

        debug!(
            net_earnings = %net_earnings,
            medicare_tax = %medicare_tax,
            social_security_tax = %social_security_tax,
            self_employment_tax = %self_employment_tax,
            "SE worksheet"
        );

        SeWorksheetResult {
            se_income,
            net_earnings,
            medicare_tax,
            ss_taxable_earnings,
            social_security_tax,
            self_employment_tax,
            se_tax_deduction,
            below_threshold: false,
        }
    }

    fn net_earnings(
        &self,
        se_income: Decimal,
    ) -> Decimal {
        round_to_cents(se_income * self.params.net_earnings_factor)
    }

    /// Line 7: what is left of the social security wage base after wages.
    fn remaining_ss_wage_base(
        &self,
        wages: Decimal,
    ) -> Decimal {
        let remaining = self.params.ss_wage_max - wages;
        if remaining <= Decimal::ZERO {
            warn!(
                ss_wage_max = %self.params.ss_wage_max,
                wages = %wages,
                "Wages exceed or equal SS wage maximum; no SS tax on SE income"
            );
            return Decimal::ZERO;
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    /// Installs a WARN-level subscriber writing to the test harness output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn params() -> SelfEmploymentParameters {
        SelfEmploymentParameters {
            ss_wage_max: dec!(176100.00),
            ss_tax_rate: dec!(0.124),
            medicare_tax_rate: dec!(0.029),
            net_earnings_factor: dec!(0.9235),
            deduction_factor: dec!(0.50),
            min_se_threshold: dec!(400.00),
        }
    }

    // =========================================================================
    // Threshold
    // =========================================================================

    #[test]
    fn income_at_threshold_owes_nothing() {
        let _guard = init_test_tracing();
        let params = params();

        let result = SeWorksheet::new(&params).calculate(dec!(400.00), dec!(0));

        assert!(result.below_threshold);
        assert_eq!(result.self_employment_tax, dec!(0));
        assert_eq!(result.se_tax_deduction, dec!(0));
    }

    #[test]
    fn income_one_cent_above_threshold_is_taxed() {
        let params = params();

        let result = SeWorksheet::new(&params).calculate(dec!(400.01), dec!(0));

        assert!(!result.below_threshold);
        // 400.01 × 0.9235 = 369.41
        assert_eq!(result.net_earnings, dec!(369.41));
        assert_eq!(result.self_employment_tax, dec!(56.52));
    }

    #[test]
    fn zero_income_is_below_threshold() {
        let params = params();

        let result = SeWorksheet::new(&params).calculate(dec!(0), dec!(85000));

        assert!(result.below_threshold);
        assert_eq!(result.net_earnings, dec!(0));
    }

    // =========================================================================
    // Full worksheet
    // =========================================================================

    #[test]
    fn no_wages_taxes_all_net_earnings() {
        let params = params();

        let result = SeWorksheet::new(&params).calculate(dec!(100000.00), dec!(0));

        assert_eq!(result.net_earnings, dec!(92350.00));
        assert_eq!(result.medicare_tax, dec!(2678.15));
        assert_eq!(result.ss_taxable_earnings, dec!(92350.00));
        assert_eq!(result.social_security_tax, dec!(11451.40));
        assert_eq!(result.self_employment_tax, dec!(14129.55));
        assert_eq!(result.se_tax_deduction, dec!(7064.78));
    }

    #[test]
    fn wages_reduce_social_security_base() {
        let params = params();

        let result = SeWorksheet::new(&params).calculate(dec!(80000.00), dec!(150000.00));

        // Remaining base = 176,100 - 150,000 = 26,100
        assert_eq!(result.ss_taxable_earnings, dec!(26100.00));
        assert_eq!(result.social_security_tax, dec!(3236.40));
        // Medicare still applies to all 73,880 of net earnings
        assert_eq!(result.medicare_tax, dec!(2142.52));
    }

    #[test]
    fn wages_above_base_leave_only_medicare() {
        let _guard = init_test_tracing();
        let params = params();

        let result = SeWorksheet::new(&params).calculate(dec!(50000.00), dec!(200000.00));

        assert_eq!(result.social_security_tax, dec!(0));
        assert_eq!(result.self_employment_tax, result.medicare_tax);
    }
}
