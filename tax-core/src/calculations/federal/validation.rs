//! Input checks run before any arithmetic.

use rust_decimal::Decimal;

use crate::error::CalculationError;
use crate::models::{TaxReturn, TaxYearConfig};

fn ensure_non_negative(
    field: &str,
    value: Decimal,
) -> Result<(), CalculationError> {
    if value < Decimal::ZERO {
        return Err(CalculationError::invalid_input(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

/// Rejects a return the engine cannot calculate.
///
/// # Errors
///
/// [`CalculationError::InvalidInput`] naming the first offending field.
pub fn validate_return(
    tax_return: &TaxReturn,
    config: &TaxYearConfig,
) -> Result<(), CalculationError> {
    if tax_return.tax_year != config.tax_year {
        return Err(CalculationError::invalid_input(
            "tax_year",
            format!(
                "return is for {} but configuration is for {}",
                tax_return.tax_year, config.tax_year
            ),
        ));
    }
    if tax_return.taxpayer.state.trim().is_empty() {
        return Err(CalculationError::invalid_input("taxpayer.state", "must not be empty"));
    }

    let income = &tax_return.income;
    let amounts = [
        ("income.wages", income.wages),
        ("income.federal_withholding", income.federal_withholding),
        ("income.state_withholding", income.state_withholding),
        ("income.taxable_interest", income.taxable_interest),
        ("income.tax_exempt_interest", income.tax_exempt_interest),
        ("income.ordinary_dividends", income.ordinary_dividends),
        ("income.qualified_dividends", income.qualified_dividends),
        ("income.capital_gain_distributions", income.capital_gain_distributions),
        ("income.self_employment_income", income.self_employment_income),
        ("income.retirement_distributions", income.retirement_distributions),
        ("income.social_security_benefits", income.social_security_benefits),
        ("income.unemployment_compensation", income.unemployment_compensation),
        ("income.other_income", income.other_income),
        (
            "income.amt_preferences.incentive_stock_options",
            income.amt_preferences.incentive_stock_options,
        ),
        (
            "income.amt_preferences.private_activity_bond_interest",
            income.amt_preferences.private_activity_bond_interest,
        ),
        ("income.amt_preferences.other", income.amt_preferences.other),
    ];
    for (field, value) in amounts {
        ensure_non_negative(field, value)?;
    }
    if income.qualified_dividends > income.ordinary_dividends {
        return Err(CalculationError::invalid_input(
            "income.qualified_dividends",
            "cannot exceed ordinary dividends",
        ));
    }

    let adjustments = &tax_return.deductions.adjustments;
    ensure_non_negative("deductions.adjustments.student_loan_interest", adjustments.student_loan_interest)?;
    ensure_non_negative("deductions.adjustments.ira_contributions", adjustments.ira_contributions)?;
    ensure_non_negative("deductions.adjustments.hsa_contributions", adjustments.hsa_contributions)?;
    ensure_non_negative("deductions.adjustments.educator_expenses", adjustments.educator_expenses)?;

    if let Some(itemized) = &tax_return.deductions.itemized {
        let amounts = [
            ("deductions.itemized.medical_expenses", itemized.medical_expenses),
            (
                "deductions.itemized.state_and_local_income_taxes",
                itemized.state_and_local_income_taxes,
            ),
            ("deductions.itemized.real_estate_taxes", itemized.real_estate_taxes),
            ("deductions.itemized.personal_property_taxes", itemized.personal_property_taxes),
            ("deductions.itemized.mortgage_interest", itemized.mortgage_interest),
            ("deductions.itemized.charitable_cash", itemized.charitable_cash),
            ("deductions.itemized.charitable_noncash", itemized.charitable_noncash),
            ("deductions.itemized.casualty_losses", itemized.casualty_losses),
            ("deductions.itemized.other", itemized.other),
        ];
        for (field, value) in amounts {
            ensure_non_negative(field, value)?;
        }
    }

    let credits = &tax_return.credits;
    let amounts = [
        ("credits.child_care_expenses", credits.child_care_expenses),
        ("credits.education_credits", credits.education_credits),
        ("credits.foreign_tax_credit", credits.foreign_tax_credit),
        ("credits.other_nonrefundable", credits.other_nonrefundable),
        ("credits.other_refundable", credits.other_refundable),
        ("credits.estimated_tax_payments", credits.estimated_tax_payments),
    ];
    for (field, value) in amounts {
        ensure_non_negative(field, value)?;
    }

    for (i, lot) in income.security_transactions.iter().enumerate() {
        let field = |name: &str| format!("income.security_transactions[{i}].{name}");
        ensure_non_negative(&field("proceeds"), lot.proceeds)?;
        ensure_non_negative(&field("cost_basis"), lot.cost_basis)?;
        ensure_non_negative(&field("shares"), lot.shares)?;
        if lot.ticker.trim().is_empty() {
            return Err(CalculationError::invalid_input(field("ticker"), "must not be empty"));
        }
        if let Some(sold) = lot.date_sold {
            if sold < lot.date_acquired {
                return Err(CalculationError::invalid_input(
                    field("date_sold"),
                    format!("{sold} precedes acquisition on {}", lot.date_acquired),
                ));
            }
        }
    }

    Ok(())
}
