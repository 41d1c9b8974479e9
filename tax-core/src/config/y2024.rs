//! Federal parameters for tax year 2024 (Rev. Proc. 2023-34).

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
        dec!(11600),
        dec!(47150),
        dec!(100525),
        dec!(191950),
        dec!(243725),
        dec!(609350),
    ])?;
    // Schedule Y-1
    let joint = schedule([
        dec!(0),
        dec!(23200),
        dec!(94300),
        dec!(201050),
        dec!(383900),
        dec!(487450),
        dec!(731200),
    ])?;
    // Schedule Y-2
    let separate = schedule([
        dec!(0),
        dec!(11600),
        dec!(47150),
        dec!(100525),
        dec!(191950),
        dec!(243725),
        dec!(365600),
    ])?;
    // Schedule Z
    let head = schedule([
        dec!(0),
        dec!(16550),
        dec!(63100),
        dec!(100500),
        dec!(191950),
        dec!(243700),
        dec!(609350),
    ])?;

    Ok(TaxYearConfig {
        tax_year: 2024,
        brackets: FilingStatusTable::federal(single, joint, separate, head),
        standard_deduction: FilingStatusTable::federal(
            dec!(14600),
            dec!(29200),
            dec!(14600),
            dec!(21900),
        ),
        additional_standard_deduction: AdditionalStandardDeduction {
            married: dec!(1550),
            unmarried: dec!(1950),
            age_threshold: 65,
        },
        capital_gains: CapitalGainsParameters {
            zero_rate_max: FilingStatusTable::federal(
                dec!(47025),
                dec!(94050),
                dec!(47025),
                dec!(63000),
            ),
            fifteen_rate_max: FilingStatusTable::federal(
                dec!(518900),
                dec!(583750),
                dec!(291850),
                dec!(551350),
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
                    phase_in_end: dec!(8260),
                    max_credit: dec!(632),
                    phase_out_start: dec!(10330),
                    phase_out_start_joint: dec!(17250),
                    phase_out_rate: dec!(0.0765),
                },
                EitcSchedule {
                    phase_in_rate: dec!(0.34),
                    phase_in_end: dec!(12390),
                    max_credit: dec!(4213),
                    phase_out_start: dec!(22720),
                    phase_out_start_joint: dec!(29640),
                    phase_out_rate: dec!(0.1598),
                },
                EitcSchedule {
                    phase_in_rate: dec!(0.40),
                    phase_in_end: dec!(17400),
                    max_credit: dec!(6960),
                    phase_out_start: dec!(22720),
                    phase_out_start_joint: dec!(29640),
                    phase_out_rate: dec!(0.2106),
                },
                EitcSchedule {
                    phase_in_rate: dec!(0.45),
                    phase_in_end: dec!(17400),
                    max_credit: dec!(7830),
                    phase_out_start: dec!(22720),
                    phase_out_start_joint: dec!(29640),
                    phase_out_rate: dec!(0.2106),
                },
            ],
            investment_income_limit: dec!(11600),
            childless_min_age: 25,
            childless_max_age: 64,
            qualifying_child_age_limit: 19,
            student_age_limit: 24,
        },
        child_tax_credit: ChildTaxCreditParameters {
            credit_per_child: dec!(2000),
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
                dec!(85700),
                dec!(133300),
                dec!(66650),
                dec!(85700),
            ),
            phase_out_threshold: FilingStatusTable::federal(
                dec!(609350),
                dec!(1218700),
                dec!(609350),
                dec!(609350),
            ),
            phase_out_rate: dec!(0.25),
            rate_breakpoint: FilingStatusTable::federal(
                dec!(232600),
                dec!(232600),
                dec!(116300),
                dec!(232600),
            ),
            low_rate: dec!(0.26),
            high_rate: dec!(0.28),
        },
        self_employment: SelfEmploymentParameters {
            ss_wage_max: dec!(168600),
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
                dec!(10000),
                dec!(10000),
                dec!(5000),
                dec!(10000),
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
