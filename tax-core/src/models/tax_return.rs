use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    FederalBreakdown, FilingStatus, SecurityTransaction, StateCalculationBreakdown, WashSaleInfo,
};

/// The aggregate root handed to the engine.
///
/// `computed` is only ever populated by
/// [`TaxEngine::calculate`](crate::TaxEngine::calculate), which works on a
/// clone and attaches every derived figure at once. A caller never observes a
/// partially computed return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxReturn {
    pub tax_year: i32,
    pub taxpayer: TaxpayerInfo,
    #[serde(default)]
    pub income: Income,
    #[serde(default)]
    pub deductions: Deductions,
    #[serde(default)]
    pub credits: TaxCredits,
    #[serde(default)]
    pub computed: Option<ComputedReturn>,
}

impl TaxReturn {
    pub fn new(
        tax_year: i32,
        taxpayer: TaxpayerInfo,
    ) -> Self {
        Self {
            tax_year,
            taxpayer,
            income: Income::default(),
            deductions: Deductions::default(),
            credits: TaxCredits::default(),
            computed: None,
        }
    }

    pub fn filing_status(&self) -> FilingStatus {
        self.taxpayer.filing_status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerInfo {
    pub filing_status: FilingStatus,
    /// Age at the end of the tax year, when known.
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub spouse_age: Option<u32>,
    #[serde(default)]
    pub is_blind: bool,
    #[serde(default)]
    pub spouse_is_blind: bool,
    /// Ordered list of dependents; the count drives credit math.
    #[serde(default)]
    pub dependents: Vec<Dependent>,
    /// Two-letter postal code of the state of residence.
    pub state: String,
    /// City of residence; selects local-tax jurisdictions.
    #[serde(default)]
    pub city: Option<String>,
}

impl TaxpayerInfo {
    pub fn new(
        filing_status: FilingStatus,
        state: impl Into<String>,
    ) -> Self {
        Self {
            filing_status,
            age: None,
            spouse_age: None,
            is_blind: false,
            spouse_is_blind: false,
            dependents: Vec::new(),
            state: state.into(),
            city: None,
        }
    }

    /// Ages of the filers on the return (one entry, or two for joint returns).
    /// Unknown ages are `None`.
    pub fn filer_ages(&self) -> Vec<Option<u32>> {
        if self.filing_status.is_joint() {
            vec![self.age, self.spouse_age]
        } else {
            vec![self.age]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
    pub name: String,
    /// Age at the end of the tax year.
    pub age: u32,
    #[serde(default)]
    pub is_student: bool,
    #[serde(default)]
    pub is_disabled: bool,
}

impl Dependent {
    pub fn child(
        name: impl Into<String>,
        age: u32,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            is_student: false,
            is_disabled: false,
        }
    }
}

/// Income items for the year. All amounts must be non-negative; losses only
/// enter through the security-transaction ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Income {
    pub wages: Decimal,
    pub federal_withholding: Decimal,
    pub state_withholding: Decimal,
    pub taxable_interest: Decimal,
    pub tax_exempt_interest: Decimal,
    pub ordinary_dividends: Decimal,
    /// Portion of ordinary dividends eligible for capital-gain rates.
    pub qualified_dividends: Decimal,
    /// Long-term capital gain distributions from funds.
    pub capital_gain_distributions: Decimal,
    /// Net profit from self-employment.
    pub self_employment_income: Decimal,
    /// Taxable pension, annuity and IRA distributions.
    pub retirement_distributions: Decimal,
    /// Gross Social Security benefits received.
    pub social_security_benefits: Decimal,
    pub unemployment_compensation: Decimal,
    pub other_income: Decimal,
    pub amt_preferences: AmtPreferences,
    pub security_transactions: Vec<SecurityTransaction>,
}

/// AMT preference items added back when computing AMTI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmtPreferences {
    /// Bargain element of incentive stock options exercised and held.
    pub incentive_stock_options: Decimal,
    pub private_activity_bond_interest: Decimal,
    pub other: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deductions {
    pub adjustments: Adjustments,
    /// Present only when the taxpayer supplied itemized amounts.
    pub itemized: Option<ItemizedDeductions>,
    /// Take the standard deduction even when itemizing would be larger.
    pub force_standard: bool,
}

/// Above-the-line adjustments to income.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    pub student_loan_interest: Decimal,
    pub ira_contributions: Decimal,
    pub hsa_contributions: Decimal,
    pub educator_expenses: Decimal,
}

/// Schedule A amounts as paid, before floors and caps are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemizedDeductions {
    pub medical_expenses: Decimal,
    pub state_and_local_income_taxes: Decimal,
    pub real_estate_taxes: Decimal,
    pub personal_property_taxes: Decimal,
    pub mortgage_interest: Decimal,
    pub charitable_cash: Decimal,
    pub charitable_noncash: Decimal,
    pub casualty_losses: Decimal,
    pub other: Decimal,
}

impl ItemizedDeductions {
    /// State and local taxes before the federal cap.
    pub fn total_taxes_paid(&self) -> Decimal {
        self.state_and_local_income_taxes + self.real_estate_taxes + self.personal_property_taxes
    }

    pub fn charitable(&self) -> Decimal {
        self.charitable_cash + self.charitable_noncash
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxCredits {
    pub child_care_expenses: Decimal,
    pub education_credits: Decimal,
    pub foreign_tax_credit: Decimal,
    pub other_nonrefundable: Decimal,
    pub other_refundable: Decimal,
    pub estimated_tax_payments: Decimal,
}

/// Everything the engine derives from a [`TaxReturn`] in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedReturn {
    pub federal: FederalBreakdown,
    pub state: StateCalculationBreakdown,
    /// Wash sales detected in the security ledger, in ledger order.
    pub wash_sales: Vec<DetectedWashSale>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedWashSale {
    pub sale_id: String,
    pub info: WashSaleInfo,
}
