//! The entry point most callers need.

use tracing::debug;

use crate::calculations::{FederalCalculator, WashSaleDetector};
use crate::config::TaxYearConfigStore;
use crate::error::{CalculationError, RegistryError};
use crate::models::{
    ComputedReturn, DetectedWashSale, FederalBreakdown, StateCalculationBreakdown, TaxReturn,
};
use crate::states::{StateContext, StateRegistry};

/// Federal and state calculation over a shared, read-only configuration.
///
/// Build one at startup and share it (`TaxEngine` is `Send + Sync`); every
/// method takes `&self` and leaves the input untouched.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{FilingStatus, TaxEngine, TaxReturn, TaxpayerInfo};
///
/// let engine = TaxEngine::builtin().unwrap();
/// let mut tax_return = TaxReturn::new(2025, TaxpayerInfo::new(FilingStatus::Single, "TX"));
/// tax_return.income.wages = dec!(100750);
/// tax_return.income.federal_withholding = dec!(14000);
///
/// let computed = engine.calculate(&tax_return).unwrap();
/// let result = computed.computed.unwrap();
///
/// assert_eq!(result.federal.taxable_income, dec!(85000));
/// assert_eq!(result.state.liability, dec!(0));
/// ```
#[derive(Debug)]
pub struct TaxEngine {
    store: TaxYearConfigStore,
    registry: StateRegistry,
    federal: FederalCalculator,
    wash_sales: WashSaleDetector,
}

impl TaxEngine {
    pub fn new(
        store: TaxYearConfigStore,
        registry: StateRegistry,
    ) -> Self {
        Self {
            store,
            registry,
            federal: FederalCalculator::new(),
            wash_sales: WashSaleDetector::new(),
        }
    }

    /// An engine over the compiled-in federal years and state rule sets.
    ///
    /// # Errors
    /// Any invalid built-in configuration, reported at startup.
    pub fn builtin() -> Result<Self, RegistryError> {
        let store = TaxYearConfigStore::builtin()?;
        let registry = StateRegistry::builtin()?;
        Ok(Self::new(store, registry))
    }

    pub fn store(&self) -> &TaxYearConfigStore {
        &self.store
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// Returns a copy of `tax_return` with `computed` filled in.
    ///
    /// # Errors
    /// * [`CalculationError::Config`] when no federal configuration exists
    ///   for the return's year.
    /// * [`CalculationError::StateNotSupported`] for an unregistered state.
    /// * [`CalculationError::InvalidInput`] for malformed input.
    ///
    /// On error nothing is attached; the caller still holds its original.
    pub fn calculate(
        &self,
        tax_return: &TaxReturn,
    ) -> Result<TaxReturn, CalculationError> {
        let federal = self.calculate_federal(tax_return)?;
        let state = self.calculate_state(tax_return, &federal)?;
        let wash_sales = self.detect_wash_sales(tax_return);

        debug!(
            tax_year = tax_return.tax_year,
            state = %state.state_code,
            federal_refund_or_owed = %federal.refund_or_owed,
            state_refund_or_owed = %state.refund_or_owed,
            wash_sales = wash_sales.len(),
            "return calculated"
        );

        let mut computed = tax_return.clone();
        computed.computed = Some(ComputedReturn {
            federal,
            state,
            wash_sales,
        });
        Ok(computed)
    }

    /// # Errors
    /// See [`TaxEngine::calculate`].
    pub fn calculate_federal(
        &self,
        tax_return: &TaxReturn,
    ) -> Result<FederalBreakdown, CalculationError> {
        let config = self.store.load(tax_return.tax_year)?;
        self.federal.calculate(tax_return, &config)
    }

    /// State result for the return's state of residence, given its federal
    /// result.
    ///
    /// # Errors
    /// See [`TaxEngine::calculate`].
    pub fn calculate_state(
        &self,
        tax_return: &TaxReturn,
        federal: &FederalBreakdown,
    ) -> Result<StateCalculationBreakdown, CalculationError> {
        let calculator = self
            .registry
            .resolve(&tax_return.taxpayer.state, tax_return.tax_year)?;
        calculator.calculate(&StateContext::new(tax_return, federal))
    }

    pub fn detect_wash_sales(
        &self,
        tax_return: &TaxReturn,
    ) -> Vec<DetectedWashSale> {
        self.wash_sales
            .detect_sales(&tax_return.income.security_transactions)
            .into_iter()
            .map(|(sale_id, info)| DetectedWashSale { sale_id, info })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::ConfigError;
    use crate::models::{FilingStatus, TaxpayerInfo};

    fn engine() -> TaxEngine {
        TaxEngine::builtin().expect("builtin configuration is valid")
    }

    fn wage_return(
        year: i32,
        state: &str,
    ) -> TaxReturn {
        let mut tax_return = TaxReturn::new(year, TaxpayerInfo::new(FilingStatus::Single, state));
        tax_return.income.wages = dec!(75000);
        tax_return
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TaxEngine>();
    }

    #[test]
    fn calculate_attaches_results_without_touching_input() {
        let tax_return = wage_return(2025, "IL");

        let computed = engine().calculate(&tax_return).expect("calculates");

        assert!(tax_return.computed.is_none());
        let result = computed.computed.expect("attached");
        assert_eq!(result.state.state_code, "IL");
        assert_eq!(result.federal.wages, dec!(75000));
    }

    #[test]
    fn calculation_is_idempotent() {
        let engine = engine();
        let tax_return = wage_return(2025, "CA");

        let first = engine.calculate(&tax_return).expect("calculates");
        let second = engine.calculate(&tax_return).expect("calculates");

        assert_eq!(first, second);
    }

    #[test]
    fn unknown_state_fails_whole_calculation() {
        let result = engine().calculate(&wage_return(2025, "ZZ"));

        assert_eq!(
            result,
            Err(CalculationError::StateNotSupported {
                state_code: "ZZ".to_string(),
                tax_year: 2025,
            })
        );
    }

    #[test]
    fn missing_year_is_config_error() {
        let result = engine().calculate(&wage_return(2023, "IL"));

        assert_eq!(result, Err(CalculationError::Config(ConfigError::NotFound(2023))));
    }

    #[test]
    fn state_rules_missing_for_supported_federal_year() {
        let result = engine().calculate(&wage_return(2024, "IL"));

        assert!(matches!(
            result,
            Err(CalculationError::StateNotSupported { tax_year: 2024, .. })
        ));
    }
}
