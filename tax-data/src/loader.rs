use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::common::round_to_cents;
use tax_core::{BracketSchedule, ConfigError, FilingStatusTable};
use tracing::debug;

use crate::error::SnapshotLoaderError;

/// Maps IRS schedule codes to filing status codes.
///
/// - Schedule X → Single (S)
/// - Schedule Y-1 → Married Filing Jointly (MFJ) and Qualifying Surviving Spouse (QSS)
/// - Schedule Y-2 → Married Filing Separately (MFS)
/// - Schedule Z → Head of Household (HOH)
pub fn schedule_to_filing_status_codes(
    schedule: &str
) -> Result<Vec<&'static str>, SnapshotLoaderError> {
    match schedule {
        "X" => Ok(vec!["S"]),
        "Y-1" => Ok(vec!["MFJ", "QSS"]),
        "Y-2" => Ok(vec!["MFS"]),
        "Z" => Ok(vec!["HOH"]),
        _ => Err(SnapshotLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: The tax owed on income up to `min_income`
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for IRS rate-schedule CSV files.
///
/// The CSV uses IRS schedule codes (X, Y-1, Y-2, Z) which are mapped to
/// filing statuses when the schedules are built.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// Returns a vector of parsed records. The reader can be any type that
    /// implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, SnapshotLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build one validated schedule per filing status from the records for
    /// `tax_year`.
    ///
    /// Each schedule must be contiguous (every `max_income` equals the next
    /// bracket's `min_income`, and only the last is open-ended) and every
    /// stated `base_tax` must equal the tax computed at that floor. All four
    /// IRS schedules are required; Y-1 serves both MFJ and QSS.
    ///
    /// # Errors
    /// * [`SnapshotLoaderError::InvalidSchedule`]: an unknown schedule code.
    /// * [`SnapshotLoaderError::Integrity`]: a gap, overlap, base-tax
    ///   mismatch, missing schedule, or a bracket table that fails validation.
    pub fn build_schedules(
        records: &[TaxBracketRecord],
        tax_year: i32,
    ) -> Result<FilingStatusTable<BracketSchedule>, SnapshotLoaderError> {
        let mut groups: BTreeMap<&str, Vec<&TaxBracketRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            schedule_to_filing_status_codes(&record.schedule)?;
            groups.entry(record.schedule.as_str()).or_default().push(record);
        }

        let mut build = |code: &str| -> Result<BracketSchedule, SnapshotLoaderError> {
            let group = groups.remove(code).ok_or_else(|| {
                ConfigError::integrity(
                    format!("{tax_year} brackets"),
                    format!("schedule {code} is missing"),
                )
            })?;
            Self::build_schedule(tax_year, code, group)
        };
        let single = build("X")?;
        let joint = build("Y-1")?;
        let separate = build("Y-2")?;
        let head_of_household = build("Z")?;

        Ok(FilingStatusTable::federal(single, joint, separate, head_of_household))
    }

    fn build_schedule(
        tax_year: i32,
        code: &str,
        mut group: Vec<&TaxBracketRecord>,
    ) -> Result<BracketSchedule, SnapshotLoaderError> {
        let context = format!("{tax_year} schedule {code}");
        group.sort_by(|a, b| a.min_income.cmp(&b.min_income));

        for (i, record) in group.iter().enumerate() {
            let next = group.get(i + 1);
            match (record.max_income, next) {
                (Some(max), Some(next)) if max != next.min_income => {
                    return Err(ConfigError::integrity(
                        &context,
                        format!(
                            "bracket ending at {max} is followed by one starting at {}",
                            next.min_income
                        ),
                    )
                    .into());
                }
                (None, Some(_)) => {
                    return Err(ConfigError::integrity(
                        &context,
                        format!("only the last bracket may be open-ended, not {}", record.min_income),
                    )
                    .into());
                }
                (Some(max), None) => {
                    return Err(ConfigError::integrity(
                        &context,
                        format!("the last bracket must be open-ended, not capped at {max}"),
                    )
                    .into());
                }
                _ => {}
            }
        }

        let pairs: Vec<(Decimal, Decimal)> = group.iter().map(|r| (r.min_income, r.rate)).collect();
        let schedule = BracketSchedule::from_pairs(&pairs)?;

        for (record, computed) in group.iter().zip(schedule.base_tax_at_floors()) {
            let computed = round_to_cents(computed);
            if record.base_tax != computed {
                return Err(ConfigError::integrity(
                    &context,
                    format!(
                        "base tax at {} is stated as {} but computes to {computed}",
                        record.min_income, record.base_tax
                    ),
                )
                .into());
            }
        }

        debug!(tax_year, schedule = code, brackets = group.len(), "built bracket schedule");
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::FilingStatus;

    use super::*;

    const TEST_CSV: &str = include_str!("../test-data/tax_brackets_2025.csv");
    const SCHEDULES: [&str; 4] = ["X", "Y-1", "Y-2", "Z"];

    fn without_line(needle: &str) -> String {
        TEST_CSV
            .lines()
            .filter(|line| !line.contains(needle))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // =========================================================================
    // parse
    // =========================================================================

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,0,11925,0,0.10";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            TaxBracketRecord {
                tax_year: 2025,
                schedule: "X".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(11925)),
                base_tax: dec!(0),
                rate: dec!(0.10),
            }
        );
    }

    #[test]
    fn test_parse_csv_unlimited_max_income() {
        let csv =
            "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,626350,,188769.75,0.37";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].max_income, None);
        assert_eq!(records[0].base_tax, dec!(188769.75));
    }

    #[test]
    fn test_parse_csv_all_schedules() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 28);
        for schedule in SCHEDULES {
            let count = records.iter().filter(|r| r.schedule == schedule).count();
            assert_eq!(count, 7, "Expected 7 brackets for schedule {}", schedule);
        }
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,schedule,min_income\n2025,X,0";

        let result = TaxBracketLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let SnapshotLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n2025,X,abc,11925,0,0.10";

        let result = TaxBracketLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(SnapshotLoaderError::CsvParse(_))));
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv = "tax_year,schedule,min_income,max_income,base_tax,rate\n";

        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    // =========================================================================
    // schedule codes
    // =========================================================================

    #[test]
    fn test_schedule_to_filing_status_codes() {
        assert_eq!(schedule_to_filing_status_codes("X").expect("maps"), vec!["S"]);
        assert_eq!(schedule_to_filing_status_codes("Y-1").expect("maps"), vec!["MFJ", "QSS"]);
        assert_eq!(schedule_to_filing_status_codes("Y-2").expect("maps"), vec!["MFS"]);
        assert_eq!(schedule_to_filing_status_codes("Z").expect("maps"), vec!["HOH"]);
    }

    #[test]
    fn test_schedule_to_filing_status_codes_invalid() {
        let result = schedule_to_filing_status_codes("INVALID");

        match result {
            Err(SnapshotLoaderError::InvalidSchedule(ref schedule)) => {
                assert_eq!(schedule, "INVALID");
            }
            other => panic!("expected InvalidSchedule, got {other:?}"),
        }
    }

    // =========================================================================
    // build_schedules
    // =========================================================================

    #[test]
    fn test_build_schedules_maps_every_status() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let table = TaxBracketLoader::build_schedules(&records, 2025).expect("valid schedules");

        assert_eq!(table.get(FilingStatus::Single).tax_on(dec!(85000)), dec!(13614.00));
        assert_eq!(
            table.get(FilingStatus::QualifyingSurvivingSpouse),
            table.get(FilingStatus::MarriedFilingJointly)
        );
        assert_eq!(table.get(FilingStatus::MarriedFilingSeparately).brackets()[6].floor, dec!(375800));
        assert_eq!(table.get(FilingStatus::HeadOfHousehold).brackets()[1].floor, dec!(17000));
    }

    #[test]
    fn test_build_schedules_matches_builtin_2025() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
        let store = tax_core::TaxYearConfigStore::builtin().expect("builtin configs are valid");

        let table = TaxBracketLoader::build_schedules(&records, 2025).expect("valid schedules");

        assert_eq!(table, store.load(2025).expect("registered").brackets);
    }

    #[test]
    fn test_build_schedules_rejects_gap() {
        let csv = TEST_CSV.replace("2025,X,11925,48475,1192.50,0.12", "2025,X,12000,48475,1192.50,0.12");
        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = TaxBracketLoader::build_schedules(&records, 2025);

        assert!(matches!(
            result,
            Err(SnapshotLoaderError::Integrity(ConfigError::Integrity { .. }))
        ));
    }

    #[test]
    fn test_build_schedules_rejects_wrong_base_tax() {
        let csv = TEST_CSV.replace("2025,Z,17000,64850,1700.00,0.12", "2025,Z,17000,64850,1701.00,0.12");
        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = TaxBracketLoader::build_schedules(&records, 2025);

        let Err(SnapshotLoaderError::Integrity(ConfigError::Integrity { reason, .. })) = result else {
            panic!("expected integrity error, got {result:?}");
        };
        assert!(reason.contains("1701"), "unexpected reason: {reason}");
    }

    #[test]
    fn test_build_schedules_requires_all_four() {
        let csv = without_line(",Y-2,");
        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = TaxBracketLoader::build_schedules(&records, 2025);

        let Err(SnapshotLoaderError::Integrity(ConfigError::Integrity { reason, .. })) = result else {
            panic!("expected integrity error, got {result:?}");
        };
        assert!(reason.contains("Y-2"), "unexpected reason: {reason}");
    }

    #[test]
    fn test_build_schedules_ignores_other_years() {
        let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let result = TaxBracketLoader::build_schedules(&records, 2024);

        assert!(matches!(result, Err(SnapshotLoaderError::Integrity(_))));
    }

    #[test]
    fn test_build_schedules_rejects_capped_last_bracket() {
        let csv = TEST_CSV.replace("2025,X,626350,,188769.75,0.37", "2025,X,626350,900000,188769.75,0.37");
        let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = TaxBracketLoader::build_schedules(&records, 2025);

        assert!(matches!(result, Err(SnapshotLoaderError::Integrity(_))));
    }
}
