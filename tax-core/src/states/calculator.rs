//! The state calculator trait and its shared template.
//!
//! [`StateCalculator::calculate`] drives every state through the same steps:
//!
//! 1. starting income (federal AGI, federal taxable income or gross income)
//! 2. additions and subtractions, giving state adjusted income
//! 3. standard vs itemized deduction
//! 4. exemptions, with any phase-out
//! 5. taxable income and tax from the schedule (plus surtax)
//! 6. credits; non-refundable ones limited to the tax
//! 7. local tax, liability and refund-or-owed
//!
//! A state with unique rules overrides only the hook it needs; the free
//! functions in this module are the default behaviour and stay callable
//! from an override.

use std::collections::BTreeMap;
use std::fmt::Debug;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{non_negative, round_to_cents};
use crate::error::CalculationError;
use crate::models::{
    FederalBreakdown, FilingStatus, ItemizedDeductions, StateCalculationBreakdown, StateCredit,
    TaxReturn,
};
use crate::states::config::{
    ExemptionKind, LocalTaxBase, StartingIncome, StateTaxConfig, StateTaxSchedule,
};

pub const PERSONAL_EXEMPTION_CREDIT: &str = "personal_exemption";
pub const DEPENDENT_CREDIT: &str = "dependent";
pub const EARNED_INCOME_CREDIT: &str = "earned_income";

/// What a state calculator sees: the return and its finished federal result.
#[derive(Debug, Clone, Copy)]
pub struct StateContext<'a> {
    pub tax_return: &'a TaxReturn,
    pub federal: &'a FederalBreakdown,
}

impl<'a> StateContext<'a> {
    pub fn new(
        tax_return: &'a TaxReturn,
        federal: &'a FederalBreakdown,
    ) -> Self {
        Self {
            tax_return,
            federal,
        }
    }

    pub fn filing_status(&self) -> FilingStatus {
        self.tax_return.taxpayer.filing_status
    }

    /// Wages plus self-employment income.
    pub fn earned_income(&self) -> Decimal {
        let income = &self.tax_return.income;
        income.wages + income.self_employment_income
    }
}

/// One state's income tax for one year.
///
/// Implementors must be shareable across threads: the registry hands the
/// same instance to every calculation.
pub trait StateCalculator: Send + Sync + Debug {
    fn config(&self) -> &StateTaxConfig;

    fn get_starting_income(
        &self,
        ctx: &StateContext<'_>,
    ) -> Decimal {
        starting_income(self.config(), ctx)
    }

    fn calculate_state_additions(
        &self,
        ctx: &StateContext<'_>,
    ) -> Decimal {
        default_additions(self.config(), ctx)
    }

    fn calculate_state_subtractions(
        &self,
        ctx: &StateContext<'_>,
    ) -> Decimal {
        default_subtractions(self.config(), ctx)
    }

    /// Tax on `taxable_income` before credits, unrounded.
    fn calculate_brackets(
        &self,
        taxable_income: Decimal,
        filing_status: FilingStatus,
    ) -> Decimal {
        schedule_tax(self.config(), taxable_income, filing_status)
    }

    /// Local (city or county) income tax, unrounded.
    fn calculate_local_tax(
        &self,
        ctx: &StateContext<'_>,
        taxable_income: Decimal,
        filing_status: FilingStatus,
    ) -> Decimal {
        default_local_tax(self.config(), ctx, taxable_income, filing_status)
    }

    /// Full state breakdown.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidInput`] when the return is for another year
    /// than this calculator's rules.
    fn calculate(
        &self,
        ctx: &StateContext<'_>,
    ) -> Result<StateCalculationBreakdown, CalculationError> {
        let config = self.config();
        let tax_return = ctx.tax_return;
        if tax_return.tax_year != config.tax_year {
            return Err(CalculationError::invalid_input(
                "tax_year",
                format!(
                    "return is for {} but {} rules are for {}",
                    tax_return.tax_year, config.state_code, config.tax_year
                ),
            ));
        }

        let status = ctx.filing_status();
        let taxpayer = &tax_return.taxpayer;
        let exemption_count = status.filer_count() + dependent_count(tax_return);

        let starting_income = round_to_cents(self.get_starting_income(ctx));
        let additions = round_to_cents(self.calculate_state_additions(ctx));
        let subtractions = round_to_cents(self.calculate_state_subtractions(ctx));
        let adjusted_income = starting_income + additions - subtractions;

        // Deductions
        let standard_deduction = round_to_cents(config.standard_deduction.as_ref().map_or(
            Decimal::ZERO,
            |rule| {
                let amount = *rule.amount.get(status);
                match &rule.phase_out {
                    Some(phase_out) => {
                        phase_out.apply(amount, adjusted_income, status, exemption_count)
                    }
                    None => amount,
                }
            },
        ));
        let itemized_deduction = config.itemized.as_ref().and_then(|rules| {
            tax_return.deductions.itemized.as_ref().map(|items| {
                round_to_cents(state_itemized(items, rules.medical_agi_floor, adjusted_income))
            })
        });
        let (deduction_used, used_itemized_deduction) = match itemized_deduction {
            Some(itemized)
                if !tax_return.deductions.force_standard && itemized > standard_deduction =>
            {
                (itemized, true)
            }
            _ => (standard_deduction, false),
        };

        // Exemptions
        let mut exemption_amount = Decimal::ZERO;
        let mut exemption_credit = None;
        if let Some(rules) = &config.exemptions {
            let full = *rules.personal.get(status)
                + rules.per_dependent * Decimal::from(dependent_count(tax_return));
            let allowed = round_to_cents(match &rules.phase_out {
                Some(phase_out) => phase_out.apply(full, adjusted_income, status, exemption_count),
                None => full,
            });
            if full > Decimal::ZERO && allowed.is_zero() {
                warn!(
                    state = %config.state_code,
                    adjusted_income = %adjusted_income,
                    "state exemption fully phased out"
                );
            }
            match rules.kind {
                ExemptionKind::Deduction => exemption_amount = allowed,
                ExemptionKind::Credit => exemption_credit = Some(allowed),
            }
        }

        let taxable_income = non_negative(adjusted_income - deduction_used - exemption_amount);
        let tax_before_credits = round_to_cents(self.calculate_brackets(taxable_income, status));

        // Credits
        let mut candidates: Vec<(&str, Decimal, bool)> = Vec::new();
        if let Some(amount) = exemption_credit {
            candidates.push((PERSONAL_EXEMPTION_CREDIT, amount, false));
        }
        if let Some(credit) = &config.dependent_credit {
            let qualifying = taxpayer
                .dependents
                .iter()
                .filter(|d| credit.age_limit.is_none_or(|limit| d.age < limit))
                .count();
            let qualifying = u32::try_from(qualifying).unwrap_or(u32::MAX);
            candidates.push((
                DEPENDENT_CREDIT,
                round_to_cents(credit.amount * Decimal::from(qualifying)),
                credit.refundable,
            ));
        }
        if let Some(eitc) = &config.eitc {
            candidates.push((
                EARNED_INCOME_CREDIT,
                round_to_cents(ctx.federal.credits.earned_income_credit * eitc.rate),
                eitc.refundable,
            ));
        }

        let mut credits = BTreeMap::new();
        let mut remaining_tax = tax_before_credits;
        let mut nonrefundable_credits = Decimal::ZERO;
        let mut refundable_credits = Decimal::ZERO;
        for (name, amount, refundable) in candidates {
            let allowed = if refundable {
                refundable_credits += amount;
                amount
            } else {
                let limited = amount.min(remaining_tax);
                remaining_tax -= limited;
                nonrefundable_credits += limited;
                limited
            };
            credits.insert(
                name.to_string(),
                StateCredit {
                    amount: allowed,
                    refundable,
                },
            );
        }

        let local_tax = round_to_cents(self.calculate_local_tax(ctx, taxable_income, status));
        let liability = tax_before_credits - nonrefundable_credits + local_tax;
        let withholding = round_to_cents(tax_return.income.state_withholding);
        let refund_or_owed = withholding + refundable_credits - liability;

        debug!(
            state = %config.state_code,
            tax_year = config.tax_year,
            adjusted_income = %adjusted_income,
            taxable_income = %taxable_income,
            tax = %tax_before_credits,
            local_tax = %local_tax,
            refund_or_owed = %refund_or_owed,
            "state calculation complete"
        );

        Ok(StateCalculationBreakdown {
            state_code: config.state_code.clone(),
            tax_year: config.tax_year,
            filing_status: status,
            starting_income,
            additions,
            subtractions,
            adjusted_income,
            standard_deduction,
            itemized_deduction,
            deduction_used,
            used_itemized_deduction,
            exemption_amount,
            taxable_income,
            tax_before_credits,
            credits,
            nonrefundable_credits,
            refundable_credits,
            local_tax,
            liability,
            withholding,
            refund_or_owed,
        })
    }
}

/// A calculator driven entirely by its [`StateTaxConfig`].
#[derive(Debug, Clone)]
pub struct StandardStateCalculator {
    config: StateTaxConfig,
}

impl StandardStateCalculator {
    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }
}

impl StateCalculator for StandardStateCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }
}

fn dependent_count(tax_return: &TaxReturn) -> u32 {
    u32::try_from(tax_return.taxpayer.dependents.len()).unwrap_or(u32::MAX)
}

pub fn starting_income(
    config: &StateTaxConfig,
    ctx: &StateContext<'_>,
) -> Decimal {
    match config.starts_from {
        StartingIncome::FederalAgi => ctx.federal.adjusted_gross_income,
        StartingIncome::FederalTaxableIncome => ctx.federal.taxable_income,
        StartingIncome::GrossIncome => ctx.federal.gross_income,
    }
}

/// Municipal bond interest, for states that tax it.
pub fn default_additions(
    config: &StateTaxConfig,
    ctx: &StateContext<'_>,
) -> Decimal {
    if config.adds_back_municipal_interest {
        ctx.tax_return.income.tax_exempt_interest
    } else {
        Decimal::ZERO
    }
}

/// Taxable Social Security (when exempt) plus the retirement exclusion.
pub fn default_subtractions(
    config: &StateTaxConfig,
    ctx: &StateContext<'_>,
) -> Decimal {
    let mut subtractions = Decimal::ZERO;
    if !config.taxes_social_security {
        subtractions += ctx.federal.taxable_social_security;
    }
    if let Some(exclusion) = &config.retirement_exclusion {
        let distributions = ctx.tax_return.income.retirement_distributions;
        let eligible = ctx
            .tax_return
            .taxpayer
            .filer_ages()
            .into_iter()
            .filter(|age| match exclusion.min_age {
                Some(min) => age.is_some_and(|a| a >= min),
                None => true,
            })
            .count();
        if eligible > 0 {
            subtractions += match exclusion.max_amount {
                Some(max) => {
                    let eligible = u32::try_from(eligible).unwrap_or(u32::MAX);
                    distributions.min(max * Decimal::from(eligible))
                }
                None => distributions,
            };
        }
    }
    subtractions
}

/// Schedule tax plus any surtax.
pub fn schedule_tax(
    config: &StateTaxConfig,
    taxable_income: Decimal,
    filing_status: FilingStatus,
) -> Decimal {
    let taxable_income = non_negative(taxable_income);
    let base = match &config.schedule {
        StateTaxSchedule::None => return Decimal::ZERO,
        StateTaxSchedule::Flat(rate) => taxable_income * *rate,
        StateTaxSchedule::Graduated(table) => table.get(filing_status).tax_on(taxable_income),
    };
    let surtax = config.surtax.as_ref().map_or(Decimal::ZERO, |surtax| {
        non_negative(taxable_income - *surtax.threshold.get(filing_status)) * surtax.rate
    });
    base + surtax
}

pub fn default_local_tax(
    config: &StateTaxConfig,
    ctx: &StateContext<'_>,
    taxable_income: Decimal,
    filing_status: FilingStatus,
) -> Decimal {
    let Some(rules) = &config.local_tax else {
        return Decimal::ZERO;
    };
    let Some(jurisdiction) = rules.jurisdiction_for(ctx.tax_return.taxpayer.city.as_deref()) else {
        return Decimal::ZERO;
    };
    let base = match jurisdiction.base {
        LocalTaxBase::StateTaxableIncome => taxable_income,
        LocalTaxBase::EarnedIncome => ctx.earned_income(),
        LocalTaxBase::FederalAgi => ctx.federal.adjusted_gross_income,
    };
    let tax = jurisdiction.tax_on(base, filing_status);
    debug!(
        state = %config.state_code,
        jurisdiction = %jurisdiction.name,
        base = %base,
        tax = %tax,
        "local tax"
    );
    tax
}

/// Itemized deductions as most states allow them: the federal categories
/// without the SALT cap, and without state income tax itself.
fn state_itemized(
    items: &ItemizedDeductions,
    medical_agi_floor: Decimal,
    adjusted_income: Decimal,
) -> Decimal {
    let medical = non_negative(items.medical_expenses - adjusted_income * medical_agi_floor);
    medical
        + items.real_estate_taxes
        + items.personal_property_taxes
        + items.mortgage_interest
        + items.charitable()
        + items.casualty_losses
        + items.other
}
