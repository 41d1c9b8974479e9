mod breakdown;
mod filing_status;
mod security_transaction;
mod tax_bracket;
mod tax_return;
mod tax_year_config;

pub use breakdown::{
    CapitalGainsSummary, FederalBreakdown, FederalCredits, StateCalculationBreakdown, StateCredit,
};
pub use filing_status::{FilingStatus, FilingStatusTable};
pub use security_transaction::{AccountType, SecurityTransaction, WashSaleInfo};
pub use tax_bracket::{BracketSchedule, TaxBracket};
pub use tax_return::{
    Adjustments, AmtPreferences, ComputedReturn, Deductions, Dependent, DetectedWashSale, Income,
    ItemizedDeductions, TaxCredits, TaxReturn, TaxpayerInfo,
};
pub use tax_year_config::{
    AdditionalStandardDeduction, AdjustmentLimits, AmtParameters, CapitalGainsParameters,
    ChildTaxCreditParameters, DependentCareParameters, EitcParameters, EitcSchedule,
    ItemizedDeductionParameters, NetInvestmentIncomeTaxParameters, SelfEmploymentParameters,
    SocialSecurityParameters, TaxYearConfig,
};
