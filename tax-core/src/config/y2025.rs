//! Federal parameters for tax year 2025 (Rev. Proc. 2024-40 as amended by
//! the 2025 reconciliation act's standard deduction and child credit changes).

use rust_decimal_macros::dec;

use crate::error::ConfigError;
use crate::models::{
    AdditionalStandardDeduction, AdjustmentLimits, AmtParameters, BracketSchedule,
    CapitalGainsParameters, ChildTaxCreditParameters, DependentCareParameters, EitcParameters,
    EitcSchedule, FilingStatusTable, ItemizedDeductionParameters, NetInvestmentIncomeTaxParameters,
    SelfEmploymentParameters, SocialSecurityParameters, TaxYearConfig,
};

const RATES: [rust_decimal::Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

fn schedule(floors: [rust_decimal::Decimal; 7]) -> Result<BracketSchedule, ConfigError> {
    let pairs: Vec<_> = floors.into_iter().zip(RATES).collect();
    BracketSchedule::from_pairs(&pairs)
}

pub(super) fn config() -> Result<TaxYearConfig, ConfigError> {
    // Schedule X
    let single = schedule([
        dec!(0),
        dec!(11925),
        dec!(48475),
        dec!(103350),
        dec!(197300),
        dec!(250525),
        dec!(626350),
    ])?;
    // Schedule Y-1
    let joint = schedule([
        dec!(0),
        dec!(23850),
        dec!(96950),
        dec!(206700),
        dec!(394600),
        dec!(501050),
        dec!(751600),
    ])?;
    // Schedule Y-2
    let separate = schedule([
        dec!(0),
        dec!(11925),
        dec!(48475),
        dec!(103350),
        dec!(197300),
        dec!(250525),
        dec!(375800),
    ])?;
    // Schedule Z
    let head = schedule([
        dec!(0),
        dec!(17000),
        dec!(64850),
        dec!(103350),
        dec!(197300),
        dec!(250500),
        dec!(626350),
    ])?;

    Ok(TaxYearConfig {
        tax_year: 2025,
        brackets: FilingStatusTable::federal(single, joint, separate, head),
        standard_deduction: FilingStatusTable::federal(
            dec!(15750),
            dec!(31500),
            dec!(15750),
            dec!(23625),
        ),
        additional_standard_deduction: AdditionalStandardDeduction {
            married: dec!(1600),
            unmarried: dec!(2000),
            age_threshold: 65,
        },
        capital_gains: CapitalGainsParameters {
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
        },
        capital_loss_limit: FilingStatusTable::federal(
            dec!(3000),
            dec!(3000),
            dec!(1500),
            dec!(3000),
        ),
        eitc: EitcParameters {
            schedules: [
                EitcSchedule {
                    phase_in_rate: dec!(0.0765),
                    phase_in_end: dec!(8490),
                    max_credit: dec!(649),
                    phase_out_start: dec!(10620),
                    phase_out_start_joint: dec!(17730),
                    phase_out_rate: dec!(0.0765),
                },
                EitcSchedule {
                    phase_in_rate: dec!(0.34),
                    phase_in_end: dec!(12730),
                    max_credit: dec!(4328),
                    phase_out_start: dec!(23350),
                    phase_out_start_joint: dec!(30470),
                    phase_out_rate: dec!(0.1598),
                },
                EitcSchedule {
                    phase_in_rate: dec!(0.40),
                    phase_in_end: dec!(17880),
                    max_credit: dec!(7152),
                    phase_out_start: dec!(23350),
                    phase_out_start_joint: dec!(30470),
                    phase_out_rate: dec!(0.2106),
                },
                EitcSchedule {
                    phase_in_rate: dec!(0.45),
                    phase_in_end: dec!(17880),
                    max_credit: dec!(8046),
                    phase_out_start: dec!(23350),
                    phase_out_start_joint: dec!(30470),
                    phase_out_rate: dec!(0.2106),
                },
            ],
            investment_income_limit: dec!(11950),
            childless_min_age: 25,
            childless_max_age: 64,
            qualifying_child_age_limit: 19,
            student_age_limit: 24,
        },
        child_tax_credit: ChildTaxCreditParameters {
            credit_per_child: dec!(2200),
            other_dependent_credit: dec!(500),
            refundable_max_per_child: dec!(1700),
            refundable_earned_income_threshold: dec!(2500),
            refundable_rate: dec!(0.15),
            phase_out_threshold: FilingStatusTable::single_joint(dec!(200000), dec!(400000)),
            phase_out_step: dec!(1000),
            phase_out_per_step: dec!(50),
            child_age_limit: 17,
        },
        amt: AmtParameters {
            exemption: FilingStatusTable::federal(
                dec!(88100),
                dec!(137000),
                dec!(68500),
                dec!(88100),
            ),
            phase_out_threshold: FilingStatusTable::federal(
                dec!(626350),
                dec!(1252700),
                dec!(626350),
                dec!(626350),
            ),
            phase_out_rate: dec!(0.25),
            rate_breakpoint: FilingStatusTable::federal(
                dec!(239100),
                dec!(239100),
                dec!(119550),
                dec!(239100),
            ),
            low_rate: dec!(0.26),
            high_rate: dec!(0.28),
        },
        self_employment: SelfEmploymentParameters {
            ss_wage_max: dec!(176100),
            ss_tax_rate: dec!(0.124),
            medicare_tax_rate: dec!(0.029),
            net_earnings_factor: dec!(0.9235),
            deduction_factor: dec!(0.50),
            min_se_threshold: dec!(400),
        },
        social_security: SocialSecurityParameters {
            base_amount: FilingStatusTable::federal(
                dec!(25000),
                dec!(32000),
                dec!(0),
                dec!(25000),
            ),
            adjusted_base_amount: FilingStatusTable::federal(
                dec!(34000),
                dec!(44000),
                dec!(0),
                dec!(34000),
            ),
            lower_inclusion_rate: dec!(0.50),
            upper_inclusion_rate: dec!(0.85),
        },
        net_investment_income_tax: NetInvestmentIncomeTaxParameters {
            rate: dec!(0.038),
            threshold: FilingStatusTable::federal(
                dec!(200000),
                dec!(250000),
                dec!(125000),
                dec!(200000),
            ),
        },
        itemized: ItemizedDeductionParameters {
            medical_agi_floor: dec!(0.075),
            salt_cap: FilingStatusTable::federal(
                dec!(40000),
                dec!(40000),
                dec!(20000),
                dec!(40000),
            ),
        },
        adjustments: AdjustmentLimits {
            student_loan_interest_max: dec!(2500),
            educator_expense_max: dec!(300),
        },
        dependent_care: DependentCareParameters {
            max_expenses_one: dec!(3000),
            max_expenses_two_or_more: dec!(6000),
            max_rate: dec!(0.35),
            min_rate: dec!(0.20),
            phase_down_start: dec!(15000),
            phase_down_step: dec!(2000),
            rate_reduction_per_step: dec!(0.01),
            qualifying_age_limit: 13,
        },
    })
}
