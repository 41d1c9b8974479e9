//! Immutable audit trails produced by one calculation pass.
//!
//! Every monetary field is already rounded to cents, so a report renderer can
//! display the values directly without further arithmetic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::FilingStatus;

/// Net capital gain or loss for the year after wash-sale adjustments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsSummary {
    pub short_term_gain: Decimal,
    pub long_term_gain: Decimal,
    /// Losses disallowed by the wash-sale rule and added back.
    pub disallowed_wash_sale_loss: Decimal,
    /// Net gain (or loss) before the annual loss limit.
    pub net_gain: Decimal,
    /// Amount included in income: the net gain, or the limited loss.
    pub included_in_income: Decimal,
    /// Net loss in excess of the annual limit, carried to next year.
    pub loss_carryover: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalCredits {
    pub child_and_dependent_care: Decimal,
    pub education: Decimal,
    pub foreign_tax: Decimal,
    pub other_nonrefundable: Decimal,
    /// Non-refundable child tax credit plus credit for other dependents.
    pub child_tax_credit: Decimal,
    pub total_nonrefundable: Decimal,
    pub additional_child_tax_credit: Decimal,
    pub earned_income_credit: Decimal,
    pub other_refundable: Decimal,
    pub total_refundable: Decimal,
}

/// Line-by-line federal result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalBreakdown {
    pub tax_year: i32,
    pub filing_status: FilingStatus,

    // Income
    pub wages: Decimal,
    pub taxable_interest: Decimal,
    pub ordinary_dividends: Decimal,
    pub qualified_dividends: Decimal,
    pub capital_gains: CapitalGainsSummary,
    pub self_employment_income: Decimal,
    pub retirement_distributions: Decimal,
    pub taxable_social_security: Decimal,
    pub unemployment_compensation: Decimal,
    pub other_income: Decimal,
    pub gross_income: Decimal,

    // Adjustments
    pub self_employment_tax_deduction: Decimal,
    pub other_adjustments: Decimal,
    pub total_adjustments: Decimal,
    pub adjusted_gross_income: Decimal,
    pub earned_income: Decimal,

    // Deductions
    pub standard_deduction: Decimal,
    /// Allowed itemized total, when itemized amounts were supplied.
    pub itemized_deduction: Option<Decimal>,
    pub deduction_used: Decimal,
    pub used_itemized_deduction: bool,
    /// State and local taxes actually deducted (after the cap).
    pub salt_deduction: Decimal,
    pub taxable_income: Decimal,

    // Tax
    pub preferential_income: Decimal,
    /// Regular tax from the schedules and capital-gain worksheet.
    pub regular_tax: Decimal,
    pub alternative_minimum_taxable_income: Decimal,
    pub amt_exemption: Decimal,
    pub tentative_minimum_tax: Decimal,
    pub alternative_minimum_tax: Decimal,
    pub tax_before_credits: Decimal,
    pub credits: FederalCredits,
    pub tax_after_credits: Decimal,

    // Other taxes and payments
    pub self_employment_tax: Decimal,
    pub net_investment_income_tax: Decimal,
    pub total_tax: Decimal,
    pub withholding: Decimal,
    pub estimated_payments: Decimal,
    pub total_payments: Decimal,
    /// Positive for a refund, negative for a balance due.
    pub refund_or_owed: Decimal,
}

impl FederalBreakdown {
    /// Federal income tax actually borne after non-refundable credits,
    /// the figure federal-tax-deduction states subtract.
    pub fn income_tax_liability(&self) -> Decimal {
        self.tax_after_credits
    }

    /// Every monetary field, labelled, in declaration order.
    pub fn monetary_fields(&self) -> Vec<(&'static str, Decimal)> {
        let cg = &self.capital_gains;
        let cr = &self.credits;
        let mut fields = vec![
            ("wages", self.wages),
            ("taxable_interest", self.taxable_interest),
            ("ordinary_dividends", self.ordinary_dividends),
            ("qualified_dividends", self.qualified_dividends),
            ("short_term_gain", cg.short_term_gain),
            ("long_term_gain", cg.long_term_gain),
            ("disallowed_wash_sale_loss", cg.disallowed_wash_sale_loss),
            ("net_gain", cg.net_gain),
            ("capital_gain_included", cg.included_in_income),
            ("loss_carryover", cg.loss_carryover),
            ("self_employment_income", self.self_employment_income),
            ("retirement_distributions", self.retirement_distributions),
            ("taxable_social_security", self.taxable_social_security),
            ("unemployment_compensation", self.unemployment_compensation),
            ("other_income", self.other_income),
            ("gross_income", self.gross_income),
            ("self_employment_tax_deduction", self.self_employment_tax_deduction),
            ("other_adjustments", self.other_adjustments),
            ("total_adjustments", self.total_adjustments),
            ("adjusted_gross_income", self.adjusted_gross_income),
            ("earned_income", self.earned_income),
            ("standard_deduction", self.standard_deduction),
            ("deduction_used", self.deduction_used),
            ("salt_deduction", self.salt_deduction),
            ("taxable_income", self.taxable_income),
            ("preferential_income", self.preferential_income),
            ("regular_tax", self.regular_tax),
            ("alternative_minimum_taxable_income", self.alternative_minimum_taxable_income),
            ("amt_exemption", self.amt_exemption),
            ("tentative_minimum_tax", self.tentative_minimum_tax),
            ("alternative_minimum_tax", self.alternative_minimum_tax),
            ("tax_before_credits", self.tax_before_credits),
            ("child_and_dependent_care", cr.child_and_dependent_care),
            ("education", cr.education),
            ("foreign_tax", cr.foreign_tax),
            ("other_nonrefundable", cr.other_nonrefundable),
            ("child_tax_credit", cr.child_tax_credit),
            ("total_nonrefundable", cr.total_nonrefundable),
            ("additional_child_tax_credit", cr.additional_child_tax_credit),
            ("earned_income_credit", cr.earned_income_credit),
            ("other_refundable", cr.other_refundable),
            ("total_refundable", cr.total_refundable),
            ("tax_after_credits", self.tax_after_credits),
            ("self_employment_tax", self.self_employment_tax),
            ("net_investment_income_tax", self.net_investment_income_tax),
            ("total_tax", self.total_tax),
            ("withholding", self.withholding),
            ("estimated_payments", self.estimated_payments),
            ("total_payments", self.total_payments),
            ("refund_or_owed", self.refund_or_owed),
        ];
        if let Some(itemized) = self.itemized_deduction {
            fields.push(("itemized_deduction", itemized));
        }
        fields
    }
}

/// A single state credit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCredit {
    pub amount: Decimal,
    pub refundable: bool,
}

/// Line-by-line state result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCalculationBreakdown {
    pub state_code: String,
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub starting_income: Decimal,
    pub additions: Decimal,
    pub subtractions: Decimal,
    pub adjusted_income: Decimal,
    pub standard_deduction: Decimal,
    pub itemized_deduction: Option<Decimal>,
    pub deduction_used: Decimal,
    pub used_itemized_deduction: bool,
    /// Exemptions taken as a deduction from income.
    pub exemption_amount: Decimal,
    pub taxable_income: Decimal,
    pub tax_before_credits: Decimal,
    /// Credits keyed by name; ordered so output is deterministic.
    pub credits: BTreeMap<String, StateCredit>,
    pub nonrefundable_credits: Decimal,
    pub refundable_credits: Decimal,
    pub local_tax: Decimal,
    pub liability: Decimal,
    pub withholding: Decimal,
    /// Positive for a refund, negative for a balance due.
    pub refund_or_owed: Decimal,
}

impl StateCalculationBreakdown {
    /// Every monetary field, labelled, in declaration order.
    pub fn monetary_fields(&self) -> Vec<(String, Decimal)> {
        let mut fields = vec![
            ("starting_income".to_string(), self.starting_income),
            ("additions".to_string(), self.additions),
            ("subtractions".to_string(), self.subtractions),
            ("adjusted_income".to_string(), self.adjusted_income),
            ("standard_deduction".to_string(), self.standard_deduction),
            ("deduction_used".to_string(), self.deduction_used),
            ("exemption_amount".to_string(), self.exemption_amount),
            ("taxable_income".to_string(), self.taxable_income),
            ("tax_before_credits".to_string(), self.tax_before_credits),
            ("nonrefundable_credits".to_string(), self.nonrefundable_credits),
            ("refundable_credits".to_string(), self.refundable_credits),
            ("local_tax".to_string(), self.local_tax),
            ("liability".to_string(), self.liability),
            ("withholding".to_string(), self.withholding),
            ("refund_or_owed".to_string(), self.refund_or_owed),
        ];
        if let Some(itemized) = self.itemized_deduction {
            fields.push(("itemized_deduction".to_string(), itemized));
        }
        for (name, credit) in &self.credits {
            fields.push((format!("credit:{name}"), credit.amount));
        }
        fields
    }
}
