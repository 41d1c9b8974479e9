//! Data-driven description of one state's income tax for one year.
//!
//! Almost every state is fully described by a [`StateTaxConfig`]; the few
//! with genuinely unique rules get a dedicated calculator in
//! [`overrides`](crate::states::overrides).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, steps_or_fraction};
use crate::error::ConfigError;
use crate::models::{BracketSchedule, FilingStatus, FilingStatusTable};

/// Which federal figure the state return starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartingIncome {
    FederalAgi,
    FederalTaxableIncome,
    /// Federal gross income, before any adjustments.
    GrossIncome,
}

/// Rate structure. A state has either one flat rate or a graduated table,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateTaxSchedule {
    /// No broad-based income tax.
    None,
    Flat(Decimal),
    Graduated(FilingStatusTable<BracketSchedule>),
}

/// Additional rate on taxable income above a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surtax {
    pub threshold: FilingStatusTable<Decimal>,
    pub rate: Decimal,
}

/// How an amount shrinks once income passes the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseOutReduction {
    /// `amount` for each `step` (or fraction) of excess income. With
    /// `per_exemption` the reduction is multiplied by the number of
    /// exemptions claimed.
    PerStep {
        step: Decimal,
        amount: Decimal,
        per_exemption: bool,
    },
    /// `percent` of the amount for each `step` (or fraction) of excess income.
    PercentPerStep { step: Decimal, percent: Decimal },
    /// A fixed share of the excess income.
    Rate(Decimal),
    /// Lost entirely once the threshold is exceeded.
    Cliff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOut {
    pub threshold: FilingStatusTable<Decimal>,
    pub reduction: PhaseOutReduction,
}

impl PhaseOut {
    /// `amount` after the phase-out, never below zero.
    pub fn apply(
        &self,
        amount: Decimal,
        income: Decimal,
        status: FilingStatus,
        exemptions: u32,
    ) -> Decimal {
        let excess = income - *self.threshold.get(status);
        if excess <= Decimal::ZERO {
            return amount;
        }
        let reduction = match &self.reduction {
            PhaseOutReduction::PerStep {
                step,
                amount: per_step,
                per_exemption,
            } => {
                let units = if *per_exemption {
                    Decimal::from(exemptions)
                } else {
                    Decimal::ONE
                };
                steps_or_fraction(excess, *step) * *per_step * units
            }
            PhaseOutReduction::PercentPerStep { step, percent } => {
                amount * (steps_or_fraction(excess, *step) * *percent).min(Decimal::ONE)
            }
            PhaseOutReduction::Rate(rate) => excess * *rate,
            PhaseOutReduction::Cliff => amount,
        };
        non_negative(amount - reduction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeductionRule {
    pub amount: FilingStatusTable<Decimal>,
    #[serde(default)]
    pub phase_out: Option<PhaseOut>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedRules {
    /// Medical expenses count above this share of state adjusted income.
    pub medical_agi_floor: Decimal,
}

/// Personal exemptions either reduce income or are taken as a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExemptionKind {
    Deduction,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionRules {
    pub kind: ExemptionKind,
    /// Total for the filer (or both filers on a joint return).
    pub personal: FilingStatusTable<Decimal>,
    pub per_dependent: Decimal,
    #[serde(default)]
    pub phase_out: Option<PhaseOut>,
}

/// Subtraction for pension, annuity and IRA distributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementExclusion {
    /// Per qualifying filer; `None` excludes all distributions.
    pub max_amount: Option<Decimal>,
    /// Filers must be at least this old; `None` means any age.
    pub min_age: Option<u32>,
}

/// State earned income credit as a share of the federal credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEitc {
    pub rate: Decimal,
    pub refundable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentCredit {
    pub amount: Decimal,
    pub refundable: bool,
    /// Only dependents younger than this qualify.
    #[serde(default)]
    pub age_limit: Option<u32>,
}

/// Income a local tax is levied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalTaxBase {
    StateTaxableIncome,
    /// Wages plus self-employment income.
    EarnedIncome,
    FederalAgi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalSchedule {
    Flat(Decimal),
    Graduated(FilingStatusTable<BracketSchedule>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalJurisdiction {
    pub name: String,
    /// City names (upper case) served by this jurisdiction.
    pub cities: Vec<String>,
    pub base: LocalTaxBase,
    pub schedule: LocalSchedule,
}

impl LocalJurisdiction {
    pub fn flat(
        name: &str,
        cities: &[&str],
        base: LocalTaxBase,
        rate: Decimal,
    ) -> Self {
        Self {
            name: name.to_string(),
            cities: cities.iter().map(|c| c.to_ascii_uppercase()).collect(),
            base,
            schedule: LocalSchedule::Flat(rate),
        }
    }

    /// Tax on `base_amount`, unrounded.
    pub fn tax_on(
        &self,
        base_amount: Decimal,
        status: FilingStatus,
    ) -> Decimal {
        match &self.schedule {
            LocalSchedule::Flat(rate) => non_negative(base_amount) * *rate,
            LocalSchedule::Graduated(table) => table.get(status).tax_on(base_amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTaxRules {
    pub jurisdictions: Vec<LocalJurisdiction>,
    /// Applies when the city matches no jurisdiction.
    #[serde(default)]
    pub default: Option<LocalJurisdiction>,
}

impl LocalTaxRules {
    /// Exact match on the trimmed, case-folded city, else the default.
    pub fn jurisdiction_for(
        &self,
        city: Option<&str>,
    ) -> Option<&LocalJurisdiction> {
        let matched = city.and_then(|city| {
            let city = city.trim().to_ascii_uppercase();
            self.jurisdictions
                .iter()
                .find(|j| j.cities.iter().any(|c| *c == city))
        });
        matched.or(self.default.as_ref())
    }
}

/// One state's rules for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxConfig {
    pub state_code: String,
    pub tax_year: i32,
    pub name: String,
    pub starts_from: StartingIncome,
    pub schedule: StateTaxSchedule,
    #[serde(default)]
    pub surtax: Option<Surtax>,
    #[serde(default)]
    pub standard_deduction: Option<StandardDeductionRule>,
    #[serde(default)]
    pub itemized: Option<ItemizedRules>,
    #[serde(default)]
    pub exemptions: Option<ExemptionRules>,
    #[serde(default)]
    pub taxes_social_security: bool,
    /// Adds federally tax-exempt interest back into income.
    #[serde(default)]
    pub adds_back_municipal_interest: bool,
    #[serde(default)]
    pub retirement_exclusion: Option<RetirementExclusion>,
    #[serde(default)]
    pub eitc: Option<StateEitc>,
    #[serde(default)]
    pub dependent_credit: Option<DependentCredit>,
    #[serde(default)]
    pub local_tax: Option<LocalTaxRules>,
}

impl StateTaxConfig {
    /// A config with the given schedule and nothing else: starts from
    /// federal AGI, no deductions, exemptions or credits, and Social Security
    /// excluded.
    pub fn new(
        state_code: &str,
        tax_year: i32,
        name: &str,
        schedule: StateTaxSchedule,
    ) -> Self {
        Self {
            state_code: state_code.to_ascii_uppercase(),
            tax_year,
            name: name.to_string(),
            starts_from: StartingIncome::FederalAgi,
            schedule,
            surtax: None,
            standard_deduction: None,
            itemized: None,
            exemptions: None,
            taxes_social_security: false,
            adds_back_municipal_interest: false,
            retirement_exclusion: None,
            eitc: None,
            dependent_credit: None,
            local_tax: None,
        }
    }

    pub fn starting_from(
        mut self,
        starts_from: StartingIncome,
    ) -> Self {
        self.starts_from = starts_from;
        self
    }

    pub fn with_surtax(
        mut self,
        threshold: FilingStatusTable<Decimal>,
        rate: Decimal,
    ) -> Self {
        self.surtax = Some(Surtax { threshold, rate });
        self
    }

    pub fn with_standard_deduction(
        mut self,
        amount: FilingStatusTable<Decimal>,
    ) -> Self {
        self.standard_deduction = Some(StandardDeductionRule {
            amount,
            phase_out: None,
        });
        self
    }

    pub fn with_standard_deduction_phase_out(
        mut self,
        phase_out: PhaseOut,
    ) -> Self {
        if let Some(rule) = self.standard_deduction.as_mut() {
            rule.phase_out = Some(phase_out);
        }
        self
    }

    /// Allows itemizing with the usual 7.5% medical floor.
    pub fn with_itemized(mut self) -> Self {
        self.itemized = Some(ItemizedRules {
            medical_agi_floor: Decimal::new(75, 3),
        });
        self
    }

    pub fn with_exemptions(
        mut self,
        kind: ExemptionKind,
        personal: FilingStatusTable<Decimal>,
        per_dependent: Decimal,
    ) -> Self {
        self.exemptions = Some(ExemptionRules {
            kind,
            personal,
            per_dependent,
            phase_out: None,
        });
        self
    }

    pub fn with_exemption_phase_out(
        mut self,
        phase_out: PhaseOut,
    ) -> Self {
        if let Some(rules) = self.exemptions.as_mut() {
            rules.phase_out = Some(phase_out);
        }
        self
    }

    pub fn taxing_social_security(mut self) -> Self {
        self.taxes_social_security = true;
        self
    }

    pub fn adding_back_municipal_interest(mut self) -> Self {
        self.adds_back_municipal_interest = true;
        self
    }

    pub fn with_retirement_exclusion(
        mut self,
        max_amount: Option<Decimal>,
        min_age: Option<u32>,
    ) -> Self {
        self.retirement_exclusion = Some(RetirementExclusion { max_amount, min_age });
        self
    }

    pub fn with_eitc(
        mut self,
        rate: Decimal,
        refundable: bool,
    ) -> Self {
        self.eitc = Some(StateEitc { rate, refundable });
        self
    }

    pub fn with_dependent_credit(
        mut self,
        amount: Decimal,
        refundable: bool,
        age_limit: Option<u32>,
    ) -> Self {
        self.dependent_credit = Some(DependentCredit {
            amount,
            refundable,
            age_limit,
        });
        self
    }

    pub fn with_local_tax(
        mut self,
        jurisdictions: Vec<LocalJurisdiction>,
        default: Option<LocalJurisdiction>,
    ) -> Self {
        self.local_tax = Some(LocalTaxRules {
            jurisdictions,
            default,
        });
        self
    }

    pub fn is_flat_tax(&self) -> bool {
        matches!(self.schedule, StateTaxSchedule::Flat(_))
    }

    pub fn has_income_tax(&self) -> bool {
        !matches!(self.schedule, StateTaxSchedule::None)
    }

    /// Checks every rate, amount and table.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Integrity`] naming the state and the offending rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let context = format!("state {} ({})", self.state_code, self.tax_year);
        let ctx = context.as_str();

        let code_ok = self.state_code.len() == 2
            && self.state_code.chars().all(|c| c.is_ascii_uppercase());
        if !code_ok {
            return Err(ConfigError::integrity(
                ctx,
                "state code must be two upper-case letters",
            ));
        }

        match &self.schedule {
            StateTaxSchedule::None => {
                if self.surtax.is_some() {
                    return Err(ConfigError::integrity(ctx, "surtax without an income tax"));
                }
            }
            StateTaxSchedule::Flat(rate) => ensure_rate(ctx, "flat rate", *rate)?,
            StateTaxSchedule::Graduated(table) => {
                if table.iter().all(|(_, schedule)| schedule.brackets().len() == 1) {
                    return Err(ConfigError::integrity(
                        ctx,
                        "a graduated schedule with one bracket per status must be declared flat",
                    ));
                }
            }
        }

        if let Some(surtax) = &self.surtax {
            ensure_rate(ctx, "surtax rate", surtax.rate)?;
            ensure_non_negative_table(ctx, "surtax threshold", &surtax.threshold)?;
        }
        if let Some(rule) = &self.standard_deduction {
            ensure_non_negative_table(ctx, "standard deduction", &rule.amount)?;
            if let Some(phase_out) = &rule.phase_out {
                validate_phase_out(ctx, "standard deduction phase-out", phase_out)?;
            }
        }
        if let Some(itemized) = &self.itemized {
            ensure_rate(ctx, "medical AGI floor", itemized.medical_agi_floor)?;
        }
        if let Some(rules) = &self.exemptions {
            ensure_non_negative_table(ctx, "personal exemption", &rules.personal)?;
            ensure_non_negative(ctx, "dependent exemption", rules.per_dependent)?;
            if let Some(phase_out) = &rules.phase_out {
                validate_phase_out(ctx, "exemption phase-out", phase_out)?;
            }
        }
        if let Some(exclusion) = &self.retirement_exclusion {
            if let Some(max) = exclusion.max_amount {
                ensure_non_negative(ctx, "retirement exclusion", max)?;
            }
        }
        if let Some(eitc) = &self.eitc {
            if eitc.rate < Decimal::ZERO || eitc.rate > Decimal::TWO {
                return Err(ConfigError::integrity(
                    ctx,
                    format!("EITC rate must be within [0, 2], got {}", eitc.rate),
                ));
            }
        }
        if let Some(credit) = &self.dependent_credit {
            ensure_non_negative(ctx, "dependent credit", credit.amount)?;
        }
        if let Some(local) = &self.local_tax {
            for jurisdiction in local.jurisdictions.iter().chain(local.default.iter()) {
                if let LocalSchedule::Flat(rate) = jurisdiction.schedule {
                    ensure_rate(ctx, &jurisdiction.name, rate)?;
                }
            }
        }
        Ok(())
    }
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

fn ensure_non_negative(
    context: &str,
    name: &str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::integrity(
            context,
            format!("{name} must be non-negative, got {value}"),
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
        ensure_non_negative(context, &format!("{name} ({})", status.as_str()), *value)?;
    }
    Ok(())
}

fn validate_phase_out(
    context: &str,
    name: &str,
    phase_out: &PhaseOut,
) -> Result<(), ConfigError> {
    ensure_non_negative_table(context, name, &phase_out.threshold)?;
    match &phase_out.reduction {
        PhaseOutReduction::PerStep { step, amount, .. } => {
            if *step <= Decimal::ZERO || *amount < Decimal::ZERO {
                return Err(ConfigError::integrity(
                    context,
                    format!("{name}: step must be positive and amount non-negative"),
                ));
            }
        }
        PhaseOutReduction::PercentPerStep { step, percent } => {
            if *step <= Decimal::ZERO {
                return Err(ConfigError::integrity(context, format!("{name}: step must be positive")));
            }
            ensure_rate(context, name, *percent)?;
        }
        PhaseOutReduction::Rate(rate) => ensure_rate(context, name, *rate)?,
        PhaseOutReduction::Cliff => {}
    }
    Ok(())
}
