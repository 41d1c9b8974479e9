//! Federal income tax calculation.
//!
//! [`FederalCalculator::calculate`] walks the return from income to
//! refund-or-owed in a fixed order:
//!
//! 1. validate every input amount
//! 2. capital gains rollup (wash sales applied, loss limited)
//! 3. self-employment tax
//! 4. taxable Social Security
//! 5. gross income, adjustments, AGI
//! 6. deduction election and taxable income
//! 7. regular tax with the capital-gain worksheet
//! 8. alternative minimum tax
//! 9. non-refundable, then refundable credits
//! 10. SE tax and net investment income tax
//! 11. payments and refund-or-owed
//!
//! Each line item is rounded to cents once, when it is finalized, and every
//! total is the sum of rounded lines.

pub mod amt;
pub mod credits;
pub mod deductions;
pub mod eitc;
pub mod preferential;
pub mod self_emp;
pub mod social_security;
pub mod validation;

pub use self_emp::{SeWorksheet, SeWorksheetResult};

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::capital_gains::CapitalGainsRollup;
use crate::calculations::common::{non_negative, round_to_cents};
use crate::calculations::wash_sale::WashSaleDetector;
use crate::error::CalculationError;
use crate::models::{FederalBreakdown, TaxReturn, TaxYearConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct FederalCalculator;

impl FederalCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Computes the full federal breakdown for `tax_return`.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidInput`] when any amount is negative, the
    /// return's year differs from the configuration's, or the ledger holds a
    /// sale dated before its acquisition.
    pub fn calculate(
        &self,
        tax_return: &TaxReturn,
        config: &TaxYearConfig,
    ) -> Result<FederalBreakdown, CalculationError> {
        validation::validate_return(tax_return, config)?;

        let taxpayer = &tax_return.taxpayer;
        let status = taxpayer.filing_status;
        let income = &tax_return.income;
        let claimed = &tax_return.credits;

        // Capital gains
        let ledger = &income.security_transactions;
        let wash_sales = WashSaleDetector::new().detect(ledger);
        let capital_gains = CapitalGainsRollup::from_ledger(ledger, &wash_sales, tax_return.tax_year)
            .summarize(
                income.capital_gain_distributions,
                *config.capital_loss_limit.get(status),
            );

        // Self-employment tax
        let wages = round_to_cents(income.wages);
        let se = SeWorksheet::new(&config.self_employment).calculate(income.self_employment_income, wages);

        // Adjustments
        let limits = &config.adjustments;
        let adjustments = &tax_return.deductions.adjustments;
        let educator_cap = limits.educator_expense_max * Decimal::from(status.filer_count());
        let other_adjustments = round_to_cents(
            adjustments.student_loan_interest.min(limits.student_loan_interest_max)
                + adjustments.ira_contributions
                + adjustments.hsa_contributions
                + adjustments.educator_expenses.min(educator_cap),
        );
        let total_adjustments = se.se_tax_deduction + other_adjustments;

        // Income
        let taxable_interest = round_to_cents(income.taxable_interest);
        let ordinary_dividends = round_to_cents(income.ordinary_dividends);
        let qualified_dividends = round_to_cents(income.qualified_dividends);
        let retirement_distributions = round_to_cents(income.retirement_distributions);
        let unemployment_compensation = round_to_cents(income.unemployment_compensation);
        let other_income = round_to_cents(income.other_income);
        let tax_exempt_interest = round_to_cents(income.tax_exempt_interest);

        let income_before_benefits = wages
            + taxable_interest
            + ordinary_dividends
            + capital_gains.included_in_income
            + se.se_income
            + retirement_distributions
            + unemployment_compensation
            + other_income;
        let taxable_social_security = social_security::taxable_benefits(
            &config.social_security,
            status,
            round_to_cents(income.social_security_benefits),
            income_before_benefits - total_adjustments,
            tax_exempt_interest,
        );
        let gross_income = income_before_benefits + taxable_social_security;
        let adjusted_gross_income = gross_income - total_adjustments;
        let earned_income = non_negative(wages + se.se_income - se.se_tax_deduction);

        // Deductions
        let election =
            deductions::elect(config, taxpayer, &tax_return.deductions, adjusted_gross_income);
        let taxable_income = non_negative(adjusted_gross_income - election.used);

        // Regular tax
        let schedule = config.brackets.get(status);
        let preferential_income = (qualified_dividends
            + preferential::net_capital_gain(capital_gains.short_term_gain, capital_gains.long_term_gain))
        .min(taxable_income);
        let regular_tax = round_to_cents(preferential::regular_tax(
            schedule,
            &config.capital_gains,
            status,
            taxable_income,
            preferential_income,
        ));

        // AMT
        let preferences = &income.amt_preferences;
        let amt = amt::calculate(
            &config.amt,
            &config.capital_gains,
            &amt::AmtInput {
                status,
                income_after_deductions: adjusted_gross_income - election.used,
                deduction_add_back: if election.used_itemized {
                    election.salt_deduction
                } else {
                    election.used
                },
                preference_items: round_to_cents(
                    preferences.incentive_stock_options
                        + preferences.private_activity_bond_interest
                        + preferences.other,
                ),
                preferential_income,
                regular_tax,
            },
        );
        let tax_before_credits = regular_tax + amt.alternative_minimum_tax;

        // Credits
        let positive_gain = non_negative(capital_gains.included_in_income);
        let earned_income_credit = eitc::calculate(
            &config.eitc,
            taxpayer,
            &eitc::EitcInput {
                earned_income,
                agi: adjusted_gross_income,
                investment_income: taxable_interest + tax_exempt_interest + ordinary_dividends + positive_gain,
            },
        );
        let credits = credits::apply(
            config,
            taxpayer,
            claimed,
            &credits::CreditInput {
                tax_before_credits,
                agi: adjusted_gross_income,
                earned_income,
                earned_income_credit,
            },
        );
        let tax_after_credits = tax_before_credits - credits.total_nonrefundable;

        // Other taxes
        let niit = &config.net_investment_income_tax;
        let net_investment_income = taxable_interest + ordinary_dividends + positive_gain;
        let net_investment_income_tax = round_to_cents(
            net_investment_income.min(non_negative(adjusted_gross_income - *niit.threshold.get(status)))
                * niit.rate,
        );
        let total_tax = tax_after_credits + se.self_employment_tax + net_investment_income_tax;

        // Payments
        let withholding = round_to_cents(income.federal_withholding);
        let estimated_payments = round_to_cents(claimed.estimated_tax_payments);
        let total_payments = withholding + estimated_payments + credits.total_refundable;
        let refund_or_owed = total_payments - total_tax;

        debug!(
            tax_year = tax_return.tax_year,
            status = %status,
            agi = %adjusted_gross_income,
            taxable_income = %taxable_income,
            total_tax = %total_tax,
            refund_or_owed = %refund_or_owed,
            "federal calculation complete"
        );

        Ok(FederalBreakdown {
            tax_year: tax_return.tax_year,
            filing_status: status,
            wages,
            taxable_interest,
            ordinary_dividends,
            qualified_dividends,
            capital_gains,
            self_employment_income: se.se_income,
            retirement_distributions,
            taxable_social_security,
            unemployment_compensation,
            other_income,
            gross_income,
            self_employment_tax_deduction: se.se_tax_deduction,
            other_adjustments,
            total_adjustments,
            adjusted_gross_income,
            earned_income,
            standard_deduction: election.standard,
            itemized_deduction: election.itemized,
            deduction_used: election.used,
            used_itemized_deduction: election.used_itemized,
            salt_deduction: election.salt_deduction,
            taxable_income,
            preferential_income,
            regular_tax,
            alternative_minimum_taxable_income: amt.amti,
            amt_exemption: amt.exemption,
            tentative_minimum_tax: amt.tentative_minimum_tax,
            alternative_minimum_tax: amt.alternative_minimum_tax,
            tax_before_credits,
            credits,
            tax_after_credits,
            self_employment_tax: se.self_employment_tax,
            net_investment_income_tax,
            total_tax,
            withholding,
            estimated_payments,
            total_payments,
            refund_or_owed,
        })
    }
}
