use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::error::{CalculationError, RegistryError};
use crate::states::calculator::StateCalculator;
use crate::states::data;

/// Registry of [`StateCalculator`] instances, keyed by `(state code, tax year)`.
///
/// Typical lifetime:
/// 1. Create with [`StateRegistry::builtin`] (or `new` + `register`).
/// 2. Call `register` once per additional calculator.
/// 3. Share read-only and call `resolve` for every state calculation.
#[derive(Debug, Default)]
pub struct StateRegistry {
    calculators: BTreeMap<(String, i32), Arc<dyn StateCalculator>>,
}

impl StateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in rule set.
    ///
    /// # Errors
    /// Any invalid or duplicated built-in config surfaces here, at startup.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for calculator in data::builtin_calculators()? {
            registry.register(calculator)?;
        }
        info!(
            calculators = registry.calculators.len(),
            "registered built-in state calculators"
        );
        Ok(registry)
    }

    /// Validate and add a calculator under its config's state code and year.
    ///
    /// # Errors
    /// * [`RegistryError::Config`]: the calculator's config fails validation.
    /// * [`RegistryError::DuplicateRegistration`]: the key is already taken.
    ///   The existing calculator stays registered.
    pub fn register(
        &mut self,
        calculator: Arc<dyn StateCalculator>,
    ) -> Result<(), RegistryError> {
        let config = calculator.config();
        config.validate()?;
        let key = (config.state_code.clone(), config.tax_year);
        if self.calculators.contains_key(&key) {
            return Err(RegistryError::DuplicateRegistration {
                state_code: key.0,
                tax_year: key.1,
            });
        }
        self.calculators.insert(key, calculator);
        Ok(())
    }

    /// The calculator for exactly `state_code` and `tax_year`. Codes are
    /// registered upper-case and matched as given.
    ///
    /// # Errors
    /// [`CalculationError::StateNotSupported`] when nothing is registered for
    /// that pair; there is no fallback to another year.
    pub fn resolve(
        &self,
        state_code: &str,
        tax_year: i32,
    ) -> Result<Arc<dyn StateCalculator>, CalculationError> {
        self.calculators
            .get(&(state_code.to_string(), tax_year))
            .cloned()
            .ok_or_else(|| CalculationError::StateNotSupported {
                state_code: state_code.to_string(),
                tax_year,
            })
    }

    /// Every registered `(state code, tax year)`, sorted.
    pub fn registered_keys(&self) -> Vec<(String, i32)> {
        self.calculators.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}
