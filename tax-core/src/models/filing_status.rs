use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// The closed set of federal filing statuses.
///
/// Every table in the configuration is keyed by this enum, and every `match`
/// on it is exhaustive, so there is no "default" status to fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingSurvivingSpouse,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 5] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
        Self::QualifyingSurvivingSpouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingSurvivingSpouse => "QSS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
            Self::QualifyingSurvivingSpouse => "Qualifying Surviving Spouse",
        }
    }

    /// True for statuses that use the joint (two-filer) tables.
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }

    /// True for statuses that take the "married" additional standard deduction.
    pub fn is_married(&self) -> bool {
        matches!(
            self,
            Self::MarriedFilingJointly
                | Self::MarriedFilingSeparately
                | Self::QualifyingSurvivingSpouse
        )
    }

    /// Number of filers covered by the return (2 for joint returns).
    pub fn filer_count(&self) -> u32 {
        if self.is_joint() { 2 } else { 1 }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FilingStatus {
    type Err = CalculationError;

    /// Parses the short status code (`S`, `MFJ`, `MFS`, `HOH`, `QSS`).
    ///
    /// Unknown codes are rejected rather than mapped to a default status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Self::Single),
            "MFJ" => Ok(Self::MarriedFilingJointly),
            "MFS" => Ok(Self::MarriedFilingSeparately),
            "HOH" => Ok(Self::HeadOfHousehold),
            "QSS" | "QW" => Ok(Self::QualifyingSurvivingSpouse),
            other => Err(CalculationError::invalid_input(
                "filing_status",
                format!("unrecognized filing status code '{other}'"),
            )),
        }
    }
}

/// One value per filing status.
///
/// Bracket schedules, standard deductions and phase-out thresholds are all
/// stored this way so that a lookup can never miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingStatusTable<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
    pub qualifying_surviving_spouse: T,
}

impl<T> FilingStatusTable<T> {
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
            FilingStatus::QualifyingSurvivingSpouse => &self.qualifying_surviving_spouse,
        }
    }

    /// Iterates `(status, value)` pairs in [`FilingStatus::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        FilingStatus::ALL.into_iter().map(move |status| (status, self.get(status)))
    }

    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(&T) -> Result<U, E>,
    ) -> Result<FilingStatusTable<U>, E> {
        Ok(FilingStatusTable {
            single: f(&self.single)?,
            married_filing_jointly: f(&self.married_filing_jointly)?,
            married_filing_separately: f(&self.married_filing_separately)?,
            head_of_household: f(&self.head_of_household)?,
            qualifying_surviving_spouse: f(&self.qualifying_surviving_spouse)?,
        })
    }
}

impl<T: Clone> FilingStatusTable<T> {
    /// The same value for every status.
    pub fn uniform(value: T) -> Self {
        Self {
            single: value.clone(),
            married_filing_jointly: value.clone(),
            married_filing_separately: value.clone(),
            head_of_household: value.clone(),
            qualifying_surviving_spouse: value,
        }
    }

    /// Separate values for joint filers; every other status uses `single`.
    ///
    /// Qualifying surviving spouses use the joint value, as they do on the
    /// federal return.
    pub fn single_joint(
        single: T,
        joint: T,
    ) -> Self {
        Self {
            single: single.clone(),
            married_filing_jointly: joint.clone(),
            married_filing_separately: single.clone(),
            head_of_household: single,
            qualifying_surviving_spouse: joint,
        }
    }

    /// Separate values for single, joint and head-of-household filers.
    /// Married filing separately uses `single`; surviving spouses use `joint`.
    pub fn single_joint_hoh(
        single: T,
        joint: T,
        head_of_household: T,
    ) -> Self {
        Self {
            single: single.clone(),
            married_filing_jointly: joint.clone(),
            married_filing_separately: single,
            head_of_household,
            qualifying_surviving_spouse: joint,
        }
    }

    /// The federal layout: surviving spouses share the joint value.
    pub fn federal(
        single: T,
        joint: T,
        separate: T,
        head_of_household: T,
    ) -> Self {
        Self {
            single,
            married_filing_jointly: joint.clone(),
            married_filing_separately: separate,
            head_of_household,
            qualifying_surviving_spouse: joint,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_every_short_code() {
        for status in FilingStatus::ALL {
            assert_eq!(status.as_str().parse::<FilingStatus>(), Ok(status));
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(" mfj ".parse::<FilingStatus>(), Ok(FilingStatus::MarriedFilingJointly));
    }

    #[test]
    fn parse_rejects_unknown_code() {
        let result = "JOINT-ISH".parse::<FilingStatus>();

        assert!(matches!(
            result,
            Err(CalculationError::InvalidInput { ref field, .. }) if field == "filing_status"
        ));
    }

    #[test]
    fn single_joint_routes_surviving_spouse_to_joint() {
        let table = FilingStatusTable::single_joint(1, 2);

        assert_eq!(*table.get(FilingStatus::QualifyingSurvivingSpouse), 2);
        assert_eq!(*table.get(FilingStatus::MarriedFilingSeparately), 1);
        assert_eq!(*table.get(FilingStatus::HeadOfHousehold), 1);
    }

    #[test]
    fn iter_visits_statuses_in_declared_order() {
        let table = FilingStatusTable::federal(1, 2, 3, 4);

        let values: Vec<_> = table.iter().map(|(_, v)| *v).collect();

        assert_eq!(values, vec![1, 2, 3, 4, 2]);
    }
}
