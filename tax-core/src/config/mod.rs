//! Versioned federal tax-year configuration.
//!
//! One immutable [`TaxYearConfig`] per tax year, held in a
//! [`TaxYearConfigStore`] that is populated once at startup. Lookups are by
//! exact year; a missing year is an error, never a silent fallback to a
//! neighbouring year.

mod y2024;
mod y2025;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::error::ConfigError;
use crate::models::TaxYearConfig;

/// Registry of federal tax-year snapshots, keyed by year.
///
/// Typical lifetime:
/// 1. Create with [`TaxYearConfigStore::builtin`] (or `new` + `register`).
/// 2. Register any externally loaded snapshots.
/// 3. Share read-only; every `load` hands out the same `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TaxYearConfigStore {
    configs: BTreeMap<i32, Arc<TaxYearConfig>>,
}

impl TaxYearConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the compiled-in snapshots (2024 and 2025).
    ///
    /// # Errors
    /// Any integrity failure in the compiled data surfaces here, at startup,
    /// rather than during a calculation.
    pub fn builtin() -> Result<Self, ConfigError> {
        let mut store = Self::new();
        store.register(y2024::config()?)?;
        store.register(y2025::config()?)?;
        Ok(store)
    }

    /// Validate and add a snapshot.
    ///
    /// # Errors
    /// * [`ConfigError::Integrity`]: the snapshot fails validation.
    /// * [`ConfigError::DuplicateYear`]: a snapshot for that year already
    ///   exists. The existing snapshot is left untouched.
    pub fn register(
        &mut self,
        config: TaxYearConfig,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        let year = config.tax_year;
        if self.configs.contains_key(&year) {
            return Err(ConfigError::DuplicateYear(year));
        }
        info!(tax_year = year, "registered tax-year configuration");
        self.configs.insert(year, Arc::new(config));
        Ok(())
    }

    /// The snapshot for exactly `year`.
    ///
    /// # Errors
    /// [`ConfigError::NotFound`] when no snapshot is registered for `year`.
    pub fn load(
        &self,
        year: i32,
    ) -> Result<Arc<TaxYearConfig>, ConfigError> {
        self.configs
            .get(&year)
            .cloned()
            .ok_or(ConfigError::NotFound(year))
    }

    /// Registered years, ascending.
    pub fn tax_years(&self) -> Vec<i32> {
        self.configs.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{BracketSchedule, FilingStatus};

    #[test]
    fn builtin_registers_2024_and_2025() {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");

        assert_eq!(store.tax_years(), vec![2024, 2025]);
    }

    #[test]
    fn load_returns_requested_year() {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");

        let config = store.load(2025).expect("2025 registered");

        assert_eq!(config.tax_year, 2025);
        assert_eq!(*config.standard_deduction.get(FilingStatus::Single), dec!(15750));
    }

    #[test]
    fn load_does_not_fall_back_to_adjacent_year() {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");

        assert_eq!(store.load(2026), Err(ConfigError::NotFound(2026)));
        assert_eq!(store.load(2023), Err(ConfigError::NotFound(2023)));
    }

    #[test]
    fn register_rejects_duplicate_year() {
        let mut store = TaxYearConfigStore::builtin().expect("builtin configs are valid");
        let again = y2025::config().expect("valid");

        let result = store.register(again);

        assert_eq!(result, Err(ConfigError::DuplicateYear(2025)));
    }

    #[test]
    fn register_rejects_invalid_snapshot() {
        let mut store = TaxYearConfigStore::new();
        let mut config = y2025::config().expect("valid");
        config.amt.high_rate = dec!(0.20);

        let result = store.register(config);

        assert!(matches!(result, Err(ConfigError::Integrity { .. })));
        assert_eq!(store.tax_years(), Vec::<i32>::new());
    }

    #[test]
    fn load_shares_the_same_snapshot() {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");

        let a = store.load(2024).expect("registered");
        let b = store.load(2024).expect("registered");

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn builtin_bracket_tables_match_their_base_tax() {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");
        let config = store.load(2024).expect("registered");
        let hoh: &BracketSchedule = config.brackets.get(FilingStatus::HeadOfHousehold);

        // 2024 Schedule Z: $16,550 at 10%
        assert_eq!(hoh.tax_on(dec!(16550)), dec!(1655.00));
    }
}
