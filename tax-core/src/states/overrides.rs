//! Calculators for states whose rules do not fit [`StateTaxConfig`] alone.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{FilingStatus, FilingStatusTable};
use crate::states::calculator::{StateCalculator, StateContext, default_subtractions, default_local_tax};
use crate::states::config::StateTaxConfig;

/// One tier of an AGI-based percentage limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgiTier {
    /// Inclusive upper AGI bound of the tier.
    pub agi_max: Decimal,
    pub percentage: Decimal,
}

/// How much of the federal income tax a state lets the taxpayer subtract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FederalTaxDeductionLimit {
    Unlimited,
    /// A percentage chosen by federal AGI, then capped. AGI above the last
    /// tier allows nothing.
    AgiTiered {
        tiers: Vec<AgiTier>,
        cap: FilingStatusTable<Decimal>,
    },
    Capped(FilingStatusTable<Decimal>),
}

impl FederalTaxDeductionLimit {
    /// The 2025 Missouri table.
    pub fn missouri() -> Self {
        let tier = |agi_max, percentage| AgiTier {
            agi_max,
            percentage,
        };
        Self::AgiTiered {
            tiers: vec![
                tier(dec!(25000), dec!(0.35)),
                tier(dec!(50000), dec!(0.25)),
                tier(dec!(100000), dec!(0.15)),
                tier(dec!(125000), dec!(0.05)),
            ],
            cap: FilingStatusTable::single_joint(dec!(5000), dec!(10000)),
        }
    }

    /// The 2025 Oregon cap.
    pub fn oregon() -> Self {
        Self::Capped(FilingStatusTable::federal(
            dec!(8500),
            dec!(8500),
            dec!(4250),
            dec!(8500),
        ))
    }

    pub fn allowed(
        &self,
        federal_tax: Decimal,
        agi: Decimal,
        status: FilingStatus,
    ) -> Decimal {
        let federal_tax = federal_tax.max(Decimal::ZERO);
        match self {
            Self::Unlimited => federal_tax,
            Self::AgiTiered { tiers, cap } => {
                let percentage = tiers
                    .iter()
                    .find(|tier| agi <= tier.agi_max)
                    .map_or(Decimal::ZERO, |tier| tier.percentage);
                (federal_tax * percentage).min(*cap.get(status))
            }
            Self::Capped(cap) => federal_tax.min(*cap.get(status)),
        }
    }
}

/// States that subtract federal income tax paid from state income.
#[derive(Debug, Clone)]
pub struct FederalTaxDeductionCalculator {
    config: StateTaxConfig,
    limit: FederalTaxDeductionLimit,
}

impl FederalTaxDeductionCalculator {
    pub fn new(
        config: StateTaxConfig,
        limit: FederalTaxDeductionLimit,
    ) -> Self {
        Self { config, limit }
    }

    pub fn limit(&self) -> &FederalTaxDeductionLimit {
        &self.limit
    }
}

impl StateCalculator for FederalTaxDeductionCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    fn calculate_state_subtractions(
        &self,
        ctx: &StateContext<'_>,
    ) -> Decimal {
        let federal = ctx.federal;
        let deduction = self.limit.allowed(
            federal.income_tax_liability(),
            federal.adjusted_gross_income,
            ctx.filing_status(),
        );
        debug!(
            state = %self.config.state_code,
            federal_tax = %federal.income_tax_liability(),
            deduction = %deduction,
            "federal income tax deduction"
        );
        default_subtractions(&self.config, ctx) + deduction
    }
}

/// Delaware, with the Wilmington city wage tax on earned income.
#[derive(Debug, Clone)]
pub struct DelawareCalculator {
    config: StateTaxConfig,
}

impl DelawareCalculator {
    pub const WILMINGTON: &'static str = "WILMINGTON";
    pub const WILMINGTON_RATE: Decimal = dec!(0.0125);

    pub fn new(config: StateTaxConfig) -> Self {
        Self { config }
    }

    fn is_wilmington(city: Option<&str>) -> bool {
        city.is_some_and(|c| c.trim().eq_ignore_ascii_case(Self::WILMINGTON))
    }
}

impl StateCalculator for DelawareCalculator {
    fn config(&self) -> &StateTaxConfig {
        &self.config
    }

    fn calculate_local_tax(
        &self,
        ctx: &StateContext<'_>,
        taxable_income: Decimal,
        filing_status: FilingStatus,
    ) -> Decimal {
        let configured = default_local_tax(&self.config, ctx, taxable_income, filing_status);
        if !Self::is_wilmington(ctx.tax_return.taxpayer.city.as_deref()) {
            return configured;
        }
        configured + ctx.earned_income().max(Decimal::ZERO) * Self::WILMINGTON_RATE
    }
}
