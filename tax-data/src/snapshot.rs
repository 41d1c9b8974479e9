use std::io::Read;

use tax_core::{BracketSchedule, FilingStatusTable, TaxYearConfig};
use tracing::{debug, info};

use crate::error::SnapshotLoaderError;

/// Reads and writes federal tax-year snapshots as JSON.
///
/// Every snapshot that comes out of the loader has passed
/// [`TaxYearConfig::validate`], so it can be registered with a
/// [`TaxYearConfigStore`](tax_core::TaxYearConfigStore) as is.
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Parse a snapshot from JSON and validate it.
    ///
    /// # Errors
    /// * [`SnapshotLoaderError::JsonParse`]: malformed JSON, a missing
    ///   field, or a bracket table that cannot be deserialized.
    /// * [`SnapshotLoaderError::Integrity`]: the snapshot parses but fails
    ///   validation.
    pub fn from_json<R: Read>(reader: R) -> Result<TaxYearConfig, SnapshotLoaderError> {
        let config: TaxYearConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        debug!(tax_year = config.tax_year, "parsed tax-year snapshot");
        Ok(config)
    }

    /// Replace the ordinary-income brackets of `config`, typically with
    /// schedules built by
    /// [`TaxBracketLoader::build_schedules`](crate::TaxBracketLoader::build_schedules).
    pub fn with_brackets(
        mut config: TaxYearConfig,
        brackets: FilingStatusTable<BracketSchedule>,
    ) -> Result<TaxYearConfig, SnapshotLoaderError> {
        config.brackets = brackets;
        config.validate()?;
        info!(tax_year = config.tax_year, "applied bracket schedules to snapshot");
        Ok(config)
    }

    /// Pretty-printed JSON for `config`.
    pub fn to_json(config: &TaxYearConfig) -> Result<String, SnapshotLoaderError> {
        Ok(serde_json::to_string_pretty(config)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{ConfigError, FilingStatus, TaxYearConfigStore};

    use super::*;

    fn builtin(year: i32) -> TaxYearConfig {
        let store = TaxYearConfigStore::builtin().expect("builtin configs are valid");
        store.load(year).expect("registered").as_ref().clone()
    }

    #[test]
    fn json_round_trip_preserves_snapshot() {
        let config = builtin(2024);

        let json = SnapshotLoader::to_json(&config).expect("serializes");
        let parsed = SnapshotLoader::from_json(json.as_bytes()).expect("parses");

        assert_eq!(parsed, config);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = SnapshotLoader::from_json("{\"tax_year\": 2025".as_bytes());

        assert!(matches!(result, Err(SnapshotLoaderError::JsonParse(_))));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let result = SnapshotLoader::from_json("{\"tax_year\": 2025}".as_bytes());

        assert!(matches!(result, Err(SnapshotLoaderError::JsonParse(_))));
    }

    #[test]
    fn invalid_snapshot_fails_integrity() {
        let mut config = builtin(2025);
        config.standard_deduction = FilingStatusTable::uniform(dec!(-1));
        let json = SnapshotLoader::to_json(&config).expect("serializes");

        let result = SnapshotLoader::from_json(json.as_bytes());

        assert!(matches!(
            result,
            Err(SnapshotLoaderError::Integrity(ConfigError::Integrity { .. }))
        ));
    }

    #[test]
    fn with_brackets_replaces_schedules() {
        let config = builtin(2025);
        let flat = BracketSchedule::flat(dec!(0.10)).expect("valid rate");

        let updated = SnapshotLoader::with_brackets(config, FilingStatusTable::uniform(flat))
            .expect("valid snapshot");

        assert_eq!(updated.brackets.get(FilingStatus::Single).tax_on(dec!(1000)), dec!(100));
    }
}
