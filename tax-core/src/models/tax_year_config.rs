use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{BracketSchedule, FilingStatus, FilingStatusTable};

/// Federal parameters for one tax year.
///
/// A snapshot is immutable once registered with a
/// [`TaxYearConfigStore`](crate::config::TaxYearConfigStore); it is shared
/// behind an `Arc` and read concurrently by every calculation for that year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub brackets: FilingStatusTable<BracketSchedule>,
    pub standard_deduction: FilingStatusTable<Decimal>,
    pub additional_standard_deduction: AdditionalStandardDeduction,
    pub capital_gains: CapitalGainsParameters,
    pub capital_loss_limit: FilingStatusTable<Decimal>,
    pub eitc: EitcParameters,
    pub child_tax_credit: ChildTaxCreditParameters,
    pub amt: AmtParameters,
    pub self_employment: SelfEmploymentParameters,
    pub social_security: SocialSecurityParameters,
    pub net_investment_income_tax: NetInvestmentIncomeTaxParameters,
    pub itemized: ItemizedDeductionParameters,
    pub adjustments: AdjustmentLimits,
    pub dependent_care: DependentCareParameters,
}

/// Extra standard deduction per qualifying condition (age 65+ or blind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalStandardDeduction {
    pub married: Decimal,
    pub unmarried: Decimal,
    pub age_threshold: u32,
}

/// Qualified dividend and capital gain tax worksheet parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsParameters {
    /// Top of the 0% bracket, measured against total taxable income.
    pub zero_rate_max: FilingStatusTable<Decimal>,
    /// Top of the 15% bracket, measured against total taxable income.
    pub fifteen_rate_max: FilingStatusTable<Decimal>,
    pub zero_rate: Decimal,
    pub fifteen_rate: Decimal,
    pub twenty_rate: Decimal,
}

/// One row of the EITC table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcSchedule {
    pub phase_in_rate: Decimal,
    /// Earned income at which the maximum credit is reached.
    pub phase_in_end: Decimal,
    pub max_credit: Decimal,
    pub phase_out_start: Decimal,
    pub phase_out_start_joint: Decimal,
    pub phase_out_rate: Decimal,
}

impl EitcSchedule {
    pub fn phase_out_start_for(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        if status.is_joint() {
            self.phase_out_start_joint
        } else {
            self.phase_out_start
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitcParameters {
    /// Indexed by qualifying children: 0, 1, 2, 3 or more.
    pub schedules: [EitcSchedule; 4],
    /// Disqualified investment income limit.
    pub investment_income_limit: Decimal,
    /// Age range for filers without qualifying children.
    pub childless_min_age: u32,
    pub childless_max_age: u32,
    /// A dependent qualifies if younger than this age...
    pub qualifying_child_age_limit: u32,
    /// ...or younger than this age and a full-time student.
    pub student_age_limit: u32,
}

impl EitcParameters {
    /// The schedule for a child count, capped at the 3+ bucket.
    pub fn schedule_for(
        &self,
        qualifying_children: usize,
    ) -> &EitcSchedule {
        &self.schedules[qualifying_children.min(3)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditParameters {
    pub credit_per_child: Decimal,
    pub other_dependent_credit: Decimal,
    /// Maximum refundable (additional child tax credit) amount per child.
    pub refundable_max_per_child: Decimal,
    pub refundable_earned_income_threshold: Decimal,
    pub refundable_rate: Decimal,
    pub phase_out_threshold: FilingStatusTable<Decimal>,
    pub phase_out_step: Decimal,
    pub phase_out_per_step: Decimal,
    /// Children must be younger than this at year end.
    pub child_age_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtParameters {
    pub exemption: FilingStatusTable<Decimal>,
    pub phase_out_threshold: FilingStatusTable<Decimal>,
    pub phase_out_rate: Decimal,
    /// Boundary between the low and high AMT rates.
    pub rate_breakpoint: FilingStatusTable<Decimal>,
    pub low_rate: Decimal,
    pub high_rate: Decimal,
}

/// Parameters of the self-employment tax worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentParameters {
    /// Maximum earnings subject to social security tax.
    pub ss_wage_max: Decimal,
    /// Combined employer and employee social security rate (12.4%).
    pub ss_tax_rate: Decimal,
    /// Combined employer and employee Medicare rate (2.9%).
    pub medicare_tax_rate: Decimal,
    /// Share of net profit subject to SE tax (92.35%).
    pub net_earnings_factor: Decimal,
    /// Deductible share of SE tax (50%).
    pub deduction_factor: Decimal,
    /// At or below this combined income no SE tax is due.
    pub min_se_threshold: Decimal,
}

/// Thresholds for the taxable portion of Social Security benefits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityParameters {
    pub base_amount: FilingStatusTable<Decimal>,
    pub adjusted_base_amount: FilingStatusTable<Decimal>,
    pub lower_inclusion_rate: Decimal,
    pub upper_inclusion_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetInvestmentIncomeTaxParameters {
    pub rate: Decimal,
    pub threshold: FilingStatusTable<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedDeductionParameters {
    /// Medical expenses are deductible above this share of AGI.
    pub medical_agi_floor: Decimal,
    pub salt_cap: FilingStatusTable<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLimits {
    pub student_loan_interest_max: Decimal,
    pub educator_expense_max: Decimal,
}

/// Child and dependent care credit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentCareParameters {
    pub max_expenses_one: Decimal,
    pub max_expenses_two_or_more: Decimal,
    pub max_rate: Decimal,
    pub min_rate: Decimal,
    pub phase_down_start: Decimal,
    pub phase_down_step: Decimal,
    pub rate_reduction_per_step: Decimal,
    pub qualifying_age_limit: u32,
}

fn ensure_rate(
    context: &str,
    name: &str,
    rate: Decimal,
) -> Result<(), ConfigError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ConfigError::integrity(
            context,
            format!("{name} must be within [0, 1], got {rate}"),
        ));
    }
    Ok(())
}

fn ensure_non_negative_table(
    context: &str,
    name: &str,
    table: &FilingStatusTable<Decimal>,
) -> Result<(), ConfigError> {
    for (status, value) in table.iter() {
        if *value < Decimal::ZERO {
            return Err(ConfigError::integrity(
                context,
                format!("{name} for {} must be non-negative, got {value}", status.as_str()),
            ));
        }
    }
    Ok(())
}

impl TaxYearConfig {
    /// Validates the snapshot.
    ///
    /// Bracket tables are already validated by [`BracketSchedule`]; this
    /// checks everything else that a calculation would otherwise trip over.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Integrity`] naming the offending parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let context = format!("tax year {}", self.tax_year);
        let ctx = context.as_str();

        ensure_non_negative_table(ctx, "standard deduction", &self.standard_deduction)?;
        ensure_non_negative_table(ctx, "capital loss limit", &self.capital_loss_limit)?;

        let cg = &self.capital_gains;
        for (status, zero_max) in cg.zero_rate_max.iter() {
            let fifteen_max = cg.fifteen_rate_max.get(status);
            if *zero_max < Decimal::ZERO || fifteen_max < zero_max {
                return Err(ConfigError::integrity(
                    ctx,
                    format!(
                        "capital gains thresholds for {} must satisfy 0 <= zero_rate_max <= fifteen_rate_max",
                        status.as_str()
                    ),
                ));
            }
        }
        ensure_rate(ctx, "capital gains zero rate", cg.zero_rate)?;
        ensure_rate(ctx, "capital gains fifteen rate", cg.fifteen_rate)?;
        ensure_rate(ctx, "capital gains twenty rate", cg.twenty_rate)?;

        for (children, schedule) in self.eitc.schedules.iter().enumerate() {
            let name = format!("EITC schedule for {children} children");
            ensure_rate(ctx, &name, schedule.phase_in_rate)?;
            ensure_rate(ctx, &name, schedule.phase_out_rate)?;
            if schedule.phase_in_end <= Decimal::ZERO || schedule.max_credit < Decimal::ZERO {
                return Err(ConfigError::integrity(
                    ctx,
                    format!("{name}: phase-in end must be positive and max credit non-negative"),
                ));
            }
            if schedule.phase_out_start < schedule.phase_in_end
                || schedule.phase_out_start_joint < schedule.phase_out_start
            {
                return Err(ConfigError::integrity(
                    ctx,
                    format!("{name}: phase-out must start at or after the plateau begins"),
                ));
            }
            if schedule.max_credit > schedule.phase_in_end * schedule.phase_in_rate + Decimal::ONE {
                return Err(ConfigError::integrity(
                    ctx,
                    format!("{name}: max credit is unreachable during phase-in"),
                ));
            }
        }

        let ctc = &self.child_tax_credit;
        if ctc.refundable_max_per_child > ctc.credit_per_child || ctc.phase_out_step <= Decimal::ZERO {
            return Err(ConfigError::integrity(
                ctx,
                "child tax credit: refundable maximum exceeds credit or phase-out step is not positive",
            ));
        }
        ensure_rate(ctx, "child tax credit refundable rate", ctc.refundable_rate)?;
        ensure_non_negative_table(ctx, "child tax credit phase-out threshold", &ctc.phase_out_threshold)?;

        let amt = &self.amt;
        ensure_non_negative_table(ctx, "AMT exemption", &amt.exemption)?;
        ensure_non_negative_table(ctx, "AMT phase-out threshold", &amt.phase_out_threshold)?;
        ensure_non_negative_table(ctx, "AMT rate breakpoint", &amt.rate_breakpoint)?;
        ensure_rate(ctx, "AMT phase-out rate", amt.phase_out_rate)?;
        ensure_rate(ctx, "AMT low rate", amt.low_rate)?;
        ensure_rate(ctx, "AMT high rate", amt.high_rate)?;
        if amt.high_rate < amt.low_rate {
            return Err(ConfigError::integrity(ctx, "AMT high rate is below the low rate"));
        }

        let se = &self.self_employment;
        if se.net_earnings_factor <= Decimal::ZERO || se.net_earnings_factor > Decimal::ONE {
            return Err(ConfigError::integrity(
                ctx,
                format!("net earnings factor must be within (0, 1], got {}", se.net_earnings_factor),
            ));
        }
        ensure_rate(ctx, "social security tax rate", se.ss_tax_rate)?;
        ensure_rate(ctx, "medicare tax rate", se.medicare_tax_rate)?;
        ensure_rate(ctx, "SE deduction factor", se.deduction_factor)?;
        if se.ss_wage_max <= Decimal::ZERO || se.min_se_threshold < Decimal::ZERO {
            return Err(ConfigError::integrity(
                ctx,
                "social security wage maximum must be positive and SE threshold non-negative",
            ));
        }

        let ss = &self.social_security;
        for (status, base) in ss.base_amount.iter() {
            if ss.adjusted_base_amount.get(status) < base {
                return Err(ConfigError::integrity(
                    ctx,
                    format!("social security adjusted base below base for {}", status.as_str()),
                ));
            }
        }
        ensure_rate(ctx, "social security lower inclusion rate", ss.lower_inclusion_rate)?;
        ensure_rate(ctx, "social security upper inclusion rate", ss.upper_inclusion_rate)?;

        ensure_rate(ctx, "NIIT rate", self.net_investment_income_tax.rate)?;
        ensure_rate(ctx, "medical AGI floor", self.itemized.medical_agi_floor)?;
        ensure_non_negative_table(ctx, "SALT cap", &self.itemized.salt_cap)?;

        let care = &self.dependent_care;
        ensure_rate(ctx, "dependent care max rate", care.max_rate)?;
        ensure_rate(ctx, "dependent care min rate", care.min_rate)?;
        if care.min_rate > care.max_rate || care.phase_down_step <= Decimal::ZERO {
            return Err(ConfigError::integrity(
                ctx,
                "dependent care: min rate exceeds max rate or step is not positive",
            ));
        }

        Ok(())
    }
}
